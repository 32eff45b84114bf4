//! Playlist and tracks

use std::sync::Arc;

use crate::engine::buffer::AudioBuffer;

/// An imported, decoded track. Immutable once created.
#[derive(Debug, Clone)]
pub struct Track {
    title: String,
    artist: String,
    samples: Arc<AudioBuffer>,
}

impl Track {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, samples: AudioBuffer) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            samples: Arc::new(samples),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn samples(&self) -> &AudioBuffer {
        &self.samples
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.duration_secs()
    }
}

/// Ordered tracks with a wrap-around cursor
///
/// The cursor is only meaningful while the playlist is non-empty. Navigation
/// moves the cursor and never reorders tracks.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
    current_index: usize,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a track to the end without moving the cursor
    pub fn append(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Move the cursor by `delta` positions, wrapping at both ends
    ///
    /// Returns the new index, or None (and does nothing) when empty.
    ///
    /// # Example
    /// ```
    /// use varispeed::engine::generate_test_tone;
    /// use varispeed::player::{Playlist, Track};
    ///
    /// let mut playlist = Playlist::new();
    /// for title in ["A", "B", "C"] {
    ///     playlist.append(Track::new(title, "", generate_test_tone(440.0, 0.01, 8000)));
    /// }
    /// assert_eq!(playlist.navigate(-1), Some(2));
    /// assert_eq!(playlist.navigate(1), Some(0));
    /// ```
    pub fn navigate(&mut self, delta: isize) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }

        let len = self.tracks.len() as isize;
        let index = (self.current_index as isize + delta % len).rem_euclid(len);
        self.current_index = index as usize;
        Some(self.current_index)
    }

    /// Point the cursor at `index`
    ///
    /// An index below zero selects the last track and an index past the end
    /// selects the first. Returns None (and does nothing) when empty.
    pub fn select(&mut self, index: isize) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }

        let len = self.tracks.len() as isize;
        self.current_index = if index < 0 {
            (len - 1) as usize
        } else if index >= len {
            0
        } else {
            index as usize
        };
        Some(self.current_index)
    }

    /// Track under the cursor, or None when empty
    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.current_index)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn last_index(&self) -> Option<usize> {
        self.tracks.len().checked_sub(1)
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }
}
