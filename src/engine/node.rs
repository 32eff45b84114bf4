//! Collaborator seams
//!
//! The controller never reaches for a global audio context. The engine
//! factory, output sink and decode service are handed in at construction so
//! tests can swap in the fakes from [`crate::engine::mock`].

use crate::engine::buffer::AudioBuffer;
use crate::engine::protocol::{EngineCommand, EngineReport};
use crate::error::Result;

/// One processing node of the realtime engine
///
/// A node runs in its own execution context. `post_message` and
/// `try_recv_report` are the two ends of its ordered message channel.
pub trait ProcessingNode: Send {
    /// Queue a command for the node
    fn post_message(&mut self, command: EngineCommand) -> Result<()>;

    /// Take the next report the node has already produced, without blocking
    fn try_recv_report(&mut self) -> Option<EngineReport>;

    /// Route the node into the output sink
    fn connect(&mut self) -> Result<()>;

    /// Detach the node from the sink and release it. Reports still in flight
    /// are dropped.
    fn disconnect(&mut self);
}

/// Creates processing nodes
pub trait EngineFactory: Send {
    /// # Errors
    /// `SessionCreate` when the node type is not available
    fn create_node(&mut self) -> Result<Box<dyn ProcessingNode>>;
}

/// Destination that renders processed audio; owns the playback clock
pub trait OutputSink: Send {
    fn is_suspended(&self) -> bool;

    fn suspend(&mut self) -> Result<()>;

    /// Returns once the clock is running again
    fn resume(&mut self) -> Result<()>;
}

/// Turns raw file bytes into decoded audio
pub trait DecodeService: Send {
    /// # Arguments
    /// * `bytes` - Complete file contents
    /// * `hint` - File name or extension, if known
    fn decode(&self, bytes: &[u8], hint: Option<&str>) -> Result<AudioBuffer>;
}
