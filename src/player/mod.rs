//! Playback Controller
//!
//! Everything on the controller side of the engine boundary:
//! - Playlist of decoded tracks
//! - Pitch and tempo parameters
//! - Position tracking with seek epochs
//! - Transport state machine and view model

pub mod params;
pub mod playlist;
pub mod position;
pub mod transport;
pub mod view;

pub use params::{
    ParameterSnapshot, ParameterStore, MAX_PITCH_SEMITONES, MAX_TEMPO_RATIO, MIN_PITCH_SEMITONES,
    MIN_TEMPO_RATIO,
};
pub use playlist::{Playlist, Track};
pub use position::{format_time, PositionTracker, TimelineDisplay, TimelinePosition};
pub use transport::{TimelineCallback, TransportController, TransportState};
pub use view::{PlayerView, PlaylistEntry, NO_TRACK_HINT, NO_TRACK_TITLE};
