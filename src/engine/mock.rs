//! Recording fakes of the engine and output sink
//!
//! These do no audio processing. Every command posted to a node is logged so
//! tests can assert on exactly what crossed the engine boundary, and reports
//! can be injected as if the engine had produced them. Handles are cheap
//! clones sharing one log, so a test keeps a copy while the player owns the
//! other.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::engine::node::{EngineFactory, OutputSink, ProcessingNode};
use crate::engine::protocol::{EngineCommand, EngineReport};
use crate::error::{PlayerError, Result};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
struct SessionRecord {
    commands: Vec<EngineCommand>,
    pending_reports: VecDeque<EngineReport>,
    connected: bool,
    live: bool,
}

#[derive(Debug, Default)]
struct EngineLog {
    sessions: Vec<SessionRecord>,
    live: usize,
    max_live: usize,
    fail_next_create: bool,
    fail_connect: bool,
}

/// Engine factory that records sessions and commands
#[derive(Debug, Clone, Default)]
pub struct MockEngine {
    log: Arc<Mutex<EngineLog>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create_node` call fail with `SessionCreate`
    pub fn fail_next_create(&self) {
        lock(&self.log).fail_next_create = true;
    }

    /// Make every `connect` fail until cleared
    pub fn set_fail_connect(&self, fail: bool) {
        lock(&self.log).fail_connect = fail;
    }

    /// Number of nodes created so far
    pub fn sessions_created(&self) -> usize {
        lock(&self.log).sessions.len()
    }

    /// Number of nodes not yet disconnected
    pub fn live_sessions(&self) -> usize {
        lock(&self.log).live
    }

    /// Highest number of simultaneously live nodes ever observed
    pub fn max_live_sessions(&self) -> usize {
        lock(&self.log).max_live
    }

    /// Whether the given session is connected to the sink
    pub fn is_connected(&self, session: usize) -> bool {
        lock(&self.log)
            .sessions
            .get(session)
            .map(|s| s.connected)
            .unwrap_or(false)
    }

    /// Commands posted to the given session, in order
    pub fn commands(&self, session: usize) -> Vec<EngineCommand> {
        lock(&self.log)
            .sessions
            .get(session)
            .map(|s| s.commands.clone())
            .unwrap_or_default()
    }

    /// Commands posted to the most recently created session
    pub fn last_commands(&self) -> Vec<EngineCommand> {
        lock(&self.log)
            .sessions
            .last()
            .map(|s| s.commands.clone())
            .unwrap_or_default()
    }

    /// Queue a position report on the most recently created session
    ///
    /// Ignored if that session has been disconnected.
    pub fn push_report(&self, frame_position: u64, epoch: u64) {
        let mut log = lock(&self.log);
        if let Some(session) = log.sessions.last_mut().filter(|s| s.live) {
            session.pending_reports.push_back(EngineReport::SourcePosition {
                frame_position,
                epoch,
            });
        }
    }
}

impl EngineFactory for MockEngine {
    fn create_node(&mut self) -> Result<Box<dyn ProcessingNode>> {
        let mut log = lock(&self.log);
        if log.fail_next_create {
            log.fail_next_create = false;
            return Err(PlayerError::SessionCreate {
                reason: "mock node type unavailable".into(),
            });
        }

        log.sessions.push(SessionRecord {
            live: true,
            ..Default::default()
        });
        log.live += 1;
        log.max_live = log.max_live.max(log.live);

        Ok(Box::new(MockNode {
            index: log.sessions.len() - 1,
            log: Arc::clone(&self.log),
            released: false,
        }))
    }
}

struct MockNode {
    index: usize,
    log: Arc<Mutex<EngineLog>>,
    released: bool,
}

impl ProcessingNode for MockNode {
    fn post_message(&mut self, command: EngineCommand) -> Result<()> {
        if self.released {
            return Err(PlayerError::EngineDisconnected {
                reason: "node already released".into(),
            });
        }
        lock(&self.log).sessions[self.index].commands.push(command);
        Ok(())
    }

    fn try_recv_report(&mut self) -> Option<EngineReport> {
        if self.released {
            return None;
        }
        lock(&self.log).sessions[self.index]
            .pending_reports
            .pop_front()
    }

    fn connect(&mut self) -> Result<()> {
        let mut log = lock(&self.log);
        if log.fail_connect {
            return Err(PlayerError::EngineDisconnected {
                reason: "mock connect failure".into(),
            });
        }
        log.sessions[self.index].connected = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let mut log = lock(&self.log);
        let session = &mut log.sessions[self.index];
        session.connected = false;
        session.live = false;
        session.pending_reports.clear();
        log.live -= 1;
    }
}

impl Drop for MockNode {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[derive(Debug, Default)]
struct SinkLog {
    suspended: bool,
    suspend_calls: usize,
    resume_calls: usize,
}

/// Output sink that only tracks its suspended flag
#[derive(Debug, Clone, Default)]
pub struct MockSink {
    log: Arc<Mutex<SinkLog>>,
}

impl MockSink {
    /// A sink whose clock starts running
    pub fn running() -> Self {
        Self::default()
    }

    /// A sink whose clock starts suspended, as a fresh browser audio context does
    pub fn suspended() -> Self {
        let sink = Self::default();
        lock(&sink.log).suspended = true;
        sink
    }

    pub fn suspend_calls(&self) -> usize {
        lock(&self.log).suspend_calls
    }

    pub fn resume_calls(&self) -> usize {
        lock(&self.log).resume_calls
    }
}

impl OutputSink for MockSink {
    fn is_suspended(&self) -> bool {
        lock(&self.log).suspended
    }

    fn suspend(&mut self) -> Result<()> {
        let mut log = lock(&self.log);
        log.suspended = true;
        log.suspend_calls += 1;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        let mut log = lock(&self.log);
        log.suspended = false;
        log.resume_calls += 1;
        Ok(())
    }
}
