//! Decoded Audio Buffers
//!
//! The decode service hands the player non-interleaved 32-bit float samples
//! at the file's native sample rate. Buffers are never resampled; the
//! processing engine is initialized with the source rate.

use crate::error::{PlayerError, Result};

// ============================================================================
// Channel Layout
// ============================================================================

/// Audio channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelLayout {
    /// Single channel (mono)
    Mono,
    /// Two channels (stereo: left, right)
    #[default]
    Stereo,
}

impl ChannelLayout {
    /// Returns the number of channels for this layout
    pub fn num_channels(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Decoded audio: outer Vec is channels, inner Vec is frames
///
/// # Example
/// ```
/// use varispeed::engine::AudioBuffer;
///
/// let buffer = AudioBuffer::new(vec![vec![0.0; 44100]], 44100).unwrap();
/// assert_eq!(buffer.num_channels(), 1);
/// assert_eq!(buffer.duration_secs(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from per-channel sample data
    ///
    /// # Errors
    /// * `EmptyAudio` - no channels were given
    /// * `Decode` - channels differ in length or the sample rate is zero
    pub fn new(samples: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if samples.is_empty() {
            return Err(PlayerError::EmptyAudio);
        }
        if sample_rate == 0 {
            return Err(PlayerError::decode("sample rate must be non-zero"));
        }

        let frames = samples[0].len();
        if samples.iter().any(|ch| ch.len() != frames) {
            return Err(PlayerError::decode(
                "channels have different lengths",
            ));
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Create a zeroed buffer
    pub fn silent(frames: usize, layout: ChannelLayout, sample_rate: u32) -> Result<Self> {
        Self::new(vec![vec![0.0; frames]; layout.num_channels()], sample_rate)
    }

    /// Create an audio buffer from interleaved sample data
    ///
    /// # Arguments
    /// * `interleaved` - Interleaved sample data (L, R, L, R, ... for stereo)
    /// * `channels` - Number of interleaved channels
    /// * `sample_rate` - Sample rate in Hz
    pub fn from_interleaved(interleaved: &[f32], channels: usize, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(PlayerError::EmptyAudio);
        }

        if interleaved.len() % channels != 0 {
            return Err(PlayerError::decode(format!(
                "Interleaved data length {} is not divisible by channel count {}",
                interleaved.len(),
                channels
            )));
        }

        let frames = interleaved.len() / channels;
        let mut samples = vec![Vec::with_capacity(frames); channels];

        for frame in interleaved.chunks_exact(channels) {
            for (ch, &sample) in frame.iter().enumerate() {
                samples[ch].push(sample);
            }
        }

        Self::new(samples, sample_rate)
    }

    /// Get the number of channels
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.samples.len()
    }

    /// Get the number of frames (samples per channel)
    #[inline]
    pub fn frames(&self) -> usize {
        self.samples.first().map(|ch| ch.len()).unwrap_or(0)
    }

    /// Check if the buffer holds no frames
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the duration in seconds
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Get a channel's samples, or None if the index is out of bounds
    #[inline]
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.samples.get(index).map(Vec::as_slice)
    }

    /// The two channels handed to the processing engine
    ///
    /// Mono sources return channel 0 twice. Sources with more than two
    /// channels return the first two.
    pub fn stereo_pair(&self) -> (&[f32], &[f32]) {
        let left = self.samples[0].as_slice();
        let right = self.samples.get(1).map(Vec::as_slice).unwrap_or(left);
        (left, right)
    }
}

// ============================================================================
// Test Signals
// ============================================================================

/// Generate a mono sine tone
///
/// Useful for exercising the player without audio files on disk.
pub fn generate_test_tone(frequency: f32, duration_secs: f32, sample_rate: u32) -> AudioBuffer {
    let frames = (duration_secs * sample_rate as f32) as usize;
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;

    let samples = (0..frames)
        .map(|i| (angular_freq * i as f32).sin())
        .collect();

    AudioBuffer {
        samples: vec![samples],
        sample_rate: sample_rate.max(1),
    }
}

/// Generate a stereo tone with different frequencies per channel
pub fn generate_stereo_test_tone(
    freq_left: f32,
    freq_right: f32,
    duration_secs: f32,
    sample_rate: u32,
) -> AudioBuffer {
    let left = generate_test_tone(freq_left, duration_secs, sample_rate);
    let right = generate_test_tone(freq_right, duration_secs, sample_rate);

    AudioBuffer {
        samples: vec![
            left.samples.into_iter().next().unwrap_or_default(),
            right.samples.into_iter().next().unwrap_or_default(),
        ],
        sample_rate: sample_rate.max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_rejects_mismatched_channels() {
        let result = AudioBuffer::new(vec![vec![0.0; 10], vec![0.0; 9]], 48000);
        assert!(matches!(result, Err(PlayerError::Decode { .. })));
    }

    #[test]
    fn test_new_rejects_zero_sample_rate() {
        assert!(AudioBuffer::new(vec![vec![0.0; 10]], 0).is_err());
    }

    #[test]
    fn test_new_rejects_no_channels() {
        assert!(matches!(
            AudioBuffer::new(Vec::new(), 48000),
            Err(PlayerError::EmptyAudio)
        ));
    }

    #[test]
    fn test_from_interleaved() {
        let interleaved = [0.1, -0.1, 0.2, -0.2, 0.3, -0.3];
        let buffer = AudioBuffer::from_interleaved(&interleaved, 2, 44100).unwrap();

        assert_eq!(buffer.num_channels(), 2);
        assert_eq!(buffer.frames(), 3);
        assert_eq!(buffer.channel(0).unwrap(), &[0.1, 0.2, 0.3]);
        assert_eq!(buffer.channel(1).unwrap(), &[-0.1, -0.2, -0.3]);
    }

    #[test]
    fn test_from_interleaved_bad_length() {
        assert!(AudioBuffer::from_interleaved(&[0.0; 5], 2, 44100).is_err());
    }

    #[test]
    fn test_duration() {
        let buffer = AudioBuffer::silent(44100 * 120, ChannelLayout::Stereo, 44100).unwrap();
        assert_relative_eq!(buffer.duration_secs(), 120.0);
    }

    #[test]
    fn test_stereo_pair_duplicates_mono() {
        let buffer = AudioBuffer::new(vec![vec![0.5, 0.25]], 8000).unwrap();
        let (left, right) = buffer.stereo_pair();
        assert_eq!(left, right);
        assert_eq!(right, &[0.5, 0.25]);
    }

    #[test]
    fn test_stereo_pair_uses_first_two_channels() {
        let buffer =
            AudioBuffer::new(vec![vec![1.0], vec![2.0], vec![3.0]], 8000).unwrap();
        assert_eq!(buffer.stereo_pair(), (&[1.0][..], &[2.0][..]));
    }

    #[test]
    fn test_generate_test_tone() {
        let tone = generate_test_tone(440.0, 0.5, 48000);
        assert_eq!(tone.frames(), 24000);
        assert_eq!(tone.num_channels(), 1);
        assert!(tone.channel(0).unwrap().iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn test_generate_stereo_test_tone() {
        let tone = generate_stereo_test_tone(440.0, 880.0, 0.1, 48000);
        assert_eq!(tone.num_channels(), 2);
        assert_ne!(tone.channel(0), tone.channel(1));
    }
}
