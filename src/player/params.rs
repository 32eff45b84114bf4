//! Pitch and tempo parameters
//!
//! Pure state. The controller forwards every stored value to the engine; the
//! store itself never talks to it.

use num_traits::clamp;
use serde::{Deserialize, Serialize};

/// Lowest pitch shift in semitones
pub const MIN_PITCH_SEMITONES: i32 = -12;
/// Highest pitch shift in semitones
pub const MAX_PITCH_SEMITONES: i32 = 12;
/// Slowest tempo ratio
pub const MIN_TEMPO_RATIO: f64 = 0.5;
/// Fastest tempo ratio
pub const MAX_TEMPO_RATIO: f64 = 2.0;

/// Current pitch and tempo, always within range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSnapshot {
    pub pitch_semitones: i32,
    pub tempo_ratio: f64,
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self {
            pitch_semitones: 0,
            tempo_ratio: 1.0,
        }
    }
}

impl ParameterSnapshot {
    /// Pitch as shown next to the slider, e.g. `-3 st`
    pub fn pitch_label(&self) -> String {
        format!("{} st", self.pitch_semitones)
    }

    /// Tempo as shown next to the slider, e.g. `1.25x`
    pub fn tempo_label(&self) -> String {
        format!("{:.2}x", self.tempo_ratio)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    current: ParameterSnapshot,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with clamped initial values
    pub fn with_initial(pitch_semitones: i32, tempo_ratio: f64) -> Self {
        let mut store = Self::new();
        store.set_pitch(pitch_semitones);
        store.set_tempo(tempo_ratio);
        store
    }

    /// Store the pitch clamped to [-12, 12] and return what was stored
    pub fn set_pitch(&mut self, semitones: i32) -> i32 {
        self.current.pitch_semitones = clamp(semitones, MIN_PITCH_SEMITONES, MAX_PITCH_SEMITONES);
        self.current.pitch_semitones
    }

    /// Store the tempo clamped to [0.5, 2.0] and return what was stored
    ///
    /// NaN is ignored and the previous tempo is returned.
    pub fn set_tempo(&mut self, ratio: f64) -> f64 {
        if !ratio.is_nan() {
            self.current.tempo_ratio = clamp(ratio, MIN_TEMPO_RATIO, MAX_TEMPO_RATIO);
        }
        self.current.tempo_ratio
    }

    pub fn snapshot(&self) -> ParameterSnapshot {
        self.current
    }
}
