//! Engine wire protocol
//!
//! Commands flow controller → engine, reports flow engine → controller. Both
//! are tagged unions serialized as `{"message": TAG, "detail": ...}`.

use serde::{Deserialize, Serialize};

/// Property names accepted by `SET_PIPE_PROP`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipeProp {
    #[serde(rename = "pitchSemitones")]
    PitchSemitones,
    #[serde(rename = "tempo")]
    Tempo,
}

impl PipeProp {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipeProp::PitchSemitones => "pitchSemitones",
            PipeProp::Tempo => "tempo",
        }
    }
}

/// Property names accepted by `SET_FILTER_PROP`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterProp {
    #[serde(rename = "sourcePosition")]
    SourcePosition,
}

/// Track description sent with `INITIALIZE_PROCESSOR`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeProcessor {
    pub sample_rate: u32,
    /// Length in frames
    pub length: u64,
    pub channel0: Vec<f32>,
    pub channel1: Vec<f32>,
}

/// Command messages posted to a processing node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "message", content = "detail")]
pub enum EngineCommand {
    #[serde(rename = "INITIALIZE_PROCESSOR")]
    InitializeProcessor(InitializeProcessor),

    #[serde(rename = "SET_PIPE_PROP")]
    SetPipeProp { name: PipeProp, value: f64 },

    /// Source position override, tagged with the seek epoch that caused it
    #[serde(rename = "SET_FILTER_PROP")]
    SetFilterProp {
        name: FilterProp,
        value: f64,
        epoch: u64,
    },
}

/// Report messages received from a processing node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "message", content = "detail")]
pub enum EngineReport {
    /// Current source frame, tagged with the latest seek epoch the node has seen
    #[serde(rename = "SOURCEPOSITION", rename_all = "camelCase")]
    SourcePosition { frame_position: u64, epoch: u64 },
}

/// A position report as seen by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionReport {
    pub frame_position: u64,
    pub epoch: u64,
}

impl From<EngineReport> for PositionReport {
    fn from(report: EngineReport) -> Self {
        match report {
            EngineReport::SourcePosition {
                frame_position,
                epoch,
            } => PositionReport {
                frame_position,
                epoch,
            },
        }
    }
}
