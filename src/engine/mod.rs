//! Audio Engine Module
//!
//! The engine side of the player:
//! - Audio buffer management and WAV decoding
//! - Command/report protocol and collaborator traits
//! - The session-owning proxy
//! - A threaded reference engine and in-memory test doubles

pub mod buffer;
pub mod decode;
pub mod mock;
pub mod node;
pub mod protocol;
pub mod proxy;
pub mod worker;

pub use buffer::{generate_stereo_test_tone, generate_test_tone, AudioBuffer, ChannelLayout};
pub use decode::WavDecoder;
pub use mock::{MockEngine, MockSink};
pub use node::{DecodeService, EngineFactory, OutputSink, ProcessingNode};
pub use protocol::{
    EngineCommand, EngineReport, FilterProp, InitializeProcessor, PipeProp, PositionReport,
};
pub use proxy::{EngineSession, ProcessingEngineProxy, ReportCallback};
pub use worker::{ClockSink, PlaybackClock, ThreadedEngine, DEFAULT_REPORT_INTERVAL};
