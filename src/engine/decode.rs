//! WAV decode service
//!
//! Decodes in-memory WAV files to 32-bit float at their native sample rate.
//! Integer PCM of 8, 16, 24 and 32 bits and 32-bit float are supported.

use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::engine::buffer::AudioBuffer;
use crate::engine::node::DecodeService;
use crate::error::{PlayerError, Result};

/// Decode service backed by `hound`
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl WavDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Read and decode a file from disk
    pub fn decode_file(&self, path: &Path) -> Result<AudioBuffer> {
        if !path.exists() {
            return Err(PlayerError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let bytes = std::fs::read(path)?;
        let hint = path.file_name().and_then(|n| n.to_str());
        self.decode(&bytes, hint)
    }
}

impl DecodeService for WavDecoder {
    fn decode(&self, bytes: &[u8], hint: Option<&str>) -> Result<AudioBuffer> {
        if let Some(ext) = hint.and_then(|h| Path::new(h).extension()).and_then(|e| e.to_str()) {
            if !ext.eq_ignore_ascii_case("wav") && !ext.eq_ignore_ascii_case("wave") {
                return Err(PlayerError::UnsupportedFormat {
                    format: ext.to_string(),
                });
            }
        }

        let reader = WavReader::new(Cursor::new(bytes)).map_err(|e| PlayerError::Decode {
            reason: format!("Failed to read WAV header: {}", e),
            source: Some(Box::new(e)),
        })?;

        let spec = reader.spec();
        let channels = spec.channels as usize;
        if channels == 0 {
            return Err(PlayerError::EmptyAudio);
        }

        let samples = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;
        if samples.len() < channels {
            return Err(PlayerError::EmptyAudio);
        }

        // A trailing partial frame is dropped
        let whole = samples.len() - samples.len() % channels;
        AudioBuffer::from_interleaved(&samples[..whole], channels, spec.sample_rate)
    }
}

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    fn collect<S, I>(samples: I, scale: f32) -> Result<Vec<f32>>
    where
        S: Into<f64>,
        I: Iterator<Item = hound::Result<S>>,
    {
        samples
            .map(|s| s.map(|v| (v.into() * scale as f64) as f32))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| PlayerError::Decode {
                reason: format!("Failed to read samples: {}", e),
                source: Some(Box::new(e)),
            })
    }

    match (sample_format, bits_per_sample) {
        (SampleFormat::Float, 32) => collect(reader.samples::<f32>(), 1.0),
        (SampleFormat::Int, 8) => collect(reader.samples::<i8>(), 1.0 / 128.0),
        (SampleFormat::Int, 16) => collect(reader.samples::<i16>(), 1.0 / 32768.0),
        // 24-bit stored as i32 in hound
        (SampleFormat::Int, 24) => collect(reader.samples::<i32>(), 1.0 / 8388608.0),
        (SampleFormat::Int, 32) => collect(reader.samples::<i32>(), 1.0 / 2147483648.0),
        (format, bits) => Err(PlayerError::UnsupportedFormat {
            format: format!("{}-bit {:?} audio", bits, format),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hound::{WavSpec, WavWriter};

    fn wav_bytes(channels: u16, sample_rate: u32, frames: &[i16]) -> Vec<u8> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for &s in frames {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_decode_stereo_16bit() {
        let bytes = wav_bytes(2, 22050, &[16384, -16384, 0, 8192]);
        let buffer = WavDecoder::new().decode(&bytes, Some("song.wav")).unwrap();

        assert_eq!(buffer.num_channels(), 2);
        assert_eq!(buffer.frames(), 2);
        assert_eq!(buffer.sample_rate(), 22050);
        assert_relative_eq!(buffer.channel(0).unwrap()[0], 0.5);
        assert_relative_eq!(buffer.channel(1).unwrap()[0], -0.5);
        assert_relative_eq!(buffer.channel(1).unwrap()[1], 0.25);
    }

    #[test]
    fn test_decode_float() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            writer.write_sample(0.75f32).unwrap();
            writer.finalize().unwrap();
        }

        let buffer = WavDecoder::new().decode(&cursor.into_inner(), None).unwrap();
        assert_relative_eq!(buffer.channel(0).unwrap()[0], 0.75);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = WavDecoder::new().decode(b"definitely not a wav file", Some("a.wav"));
        assert!(matches!(result, Err(PlayerError::Decode { .. })));
    }

    #[test]
    fn test_decode_empty_data_chunk() {
        let bytes = wav_bytes(1, 44100, &[]);
        let result = WavDecoder::new().decode(&bytes, None);
        assert!(matches!(result, Err(PlayerError::EmptyAudio)));
    }

    #[test]
    fn test_decode_rejects_other_extensions() {
        let bytes = wav_bytes(1, 44100, &[1, 2, 3]);
        let result = WavDecoder::new().decode(&bytes, Some("track.mp3"));
        assert!(matches!(result, Err(PlayerError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_decode_file_missing() {
        let result = WavDecoder::new().decode_file(Path::new("/nonexistent/track.wav"));
        assert!(matches!(result, Err(PlayerError::FileNotFound { .. })));
    }

    #[test]
    fn test_decode_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        std::fs::write(&path, wav_bytes(1, 8000, &[0; 800])).unwrap();

        let buffer = WavDecoder::new().decode_file(&path).unwrap();
        assert_relative_eq!(buffer.duration_secs(), 0.1);
    }
}
