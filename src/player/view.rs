//! View model for renderers
//!
//! A UI only ever reads a [`PlayerView`] and forwards user input to the
//! controller's command methods.

use serde::Serialize;

use crate::player::position::TimelineDisplay;
use crate::player::transport::TransportState;

/// Title shown before any track is imported
pub const NO_TRACK_TITLE: &str = "No track";
/// Artist line shown before any track is imported
pub const NO_TRACK_HINT: &str = "Import an audio file…";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistEntry {
    pub index: usize,
    pub title: String,
    /// The entry under the playlist cursor
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub state: TransportState,
    pub title: String,
    pub artist: String,
    pub is_playing: bool,
    pub pitch_label: String,
    pub tempo_label: String,
    pub timeline: TimelineDisplay,
    pub playlist: Vec<PlaylistEntry>,
}

impl PlayerView {
    /// Single status line, e.g. `▶ Song.wav - Local File  1:00 / 2:00  [2 st, 1.25x]`
    pub fn status_line(&self) -> String {
        let glyph = if self.is_playing { '▶' } else { '⏸' };
        format!(
            "{} {} - {}  {}  [{}, {}]",
            glyph, self.title, self.artist, self.timeline, self.pitch_label, self.tempo_label
        )
    }
}
