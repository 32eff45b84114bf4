//! Varispeed - Pitch and Tempo Playback Controller
//!
//! Varispeed plays decoded audio through an external realtime engine while
//! the user changes pitch (in semitones) and tempo (as a ratio) live.
//!
//! # Architecture
//!
//! The controller and the engine run on different threads and only exchange
//! messages:
//! - Controller side: [`player::TransportController`] owns the playlist,
//!   parameters and position tracker
//! - Boundary: [`engine::ProcessingEngineProxy`] owns the single live session
//! - Engine side: anything implementing [`engine::EngineFactory`]

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod player;

pub use config::PlayerConfig;
pub use error::{PlayerError, Result};
