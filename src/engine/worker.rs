//! Threaded reference engine
//!
//! Each processing node runs on its own thread and talks to the controller
//! only through two crossbeam channels. The node keeps the source position
//! moving at `tempo` times real time while the shared playback clock runs, and
//! reports it at a fixed cadence. Pitch is accepted and stored; this engine
//! does not shift pitch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use tracing::{debug, warn};

use crate::engine::node::{EngineFactory, OutputSink, ProcessingNode};
use crate::engine::protocol::{EngineCommand, EngineReport, FilterProp, PipeProp};
use crate::error::{PlayerError, Result};

/// Default report cadence
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// Playback Clock
// ============================================================================

/// Playback clock shared between the output sink and every node
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    suspended: Arc<AtomicBool>,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackClock {
    /// A clock that starts suspended
    pub fn new() -> Self {
        Self {
            suspended: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::Acquire)
    }

    fn set_suspended(&self, suspended: bool) {
        self.suspended.store(suspended, Ordering::Release);
    }
}

/// Output sink driving a [`PlaybackClock`]
#[derive(Debug, Clone)]
pub struct ClockSink {
    clock: PlaybackClock,
}

impl ClockSink {
    pub fn new(clock: PlaybackClock) -> Self {
        Self { clock }
    }
}

impl OutputSink for ClockSink {
    fn is_suspended(&self) -> bool {
        self.clock.is_suspended()
    }

    fn suspend(&mut self) -> Result<()> {
        self.clock.set_suspended(true);
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        // The flag store is visible to every node before this returns
        self.clock.set_suspended(false);
        Ok(())
    }
}

// ============================================================================
// Engine Factory
// ============================================================================

/// Factory spawning one worker thread per processing node
#[derive(Debug, Clone)]
pub struct ThreadedEngine {
    clock: PlaybackClock,
    report_interval: Duration,
}

impl ThreadedEngine {
    pub fn new(clock: PlaybackClock, report_interval: Duration) -> Self {
        Self {
            clock,
            report_interval,
        }
    }
}

impl EngineFactory for ThreadedEngine {
    fn create_node(&mut self) -> Result<Box<dyn ProcessingNode>> {
        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        let (report_tx, report_rx) = crossbeam_channel::unbounded();

        let worker = Worker {
            commands: command_rx,
            reports: report_tx,
            clock: self.clock.clone(),
            interval: self.report_interval,
            processor: Processor::default(),
            connected: false,
        };

        let handle = thread::Builder::new()
            .name("varispeed-engine".into())
            .spawn(move || worker.run())
            .map_err(|e| PlayerError::SessionCreate {
                reason: format!("failed to spawn engine thread: {}", e),
            })?;

        Ok(Box::new(WorkerNode {
            commands: command_tx,
            reports: report_rx,
            handle: Some(handle),
        }))
    }
}

// ============================================================================
// Node Handle (controller side)
// ============================================================================

enum NodeMessage {
    Command(EngineCommand),
    Connect,
    Disconnect,
}

struct WorkerNode {
    commands: Sender<NodeMessage>,
    reports: Receiver<EngineReport>,
    handle: Option<JoinHandle<()>>,
}

impl WorkerNode {
    fn send(&self, message: NodeMessage) -> Result<()> {
        self.commands
            .send(message)
            .map_err(|_| PlayerError::EngineDisconnected {
                reason: "engine thread exited".into(),
            })
    }
}

impl ProcessingNode for WorkerNode {
    fn post_message(&mut self, command: EngineCommand) -> Result<()> {
        self.send(NodeMessage::Command(command))
    }

    fn try_recv_report(&mut self) -> Option<EngineReport> {
        self.handle.as_ref()?;
        match self.reports.try_recv() {
            Ok(report) => Some(report),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    fn connect(&mut self) -> Result<()> {
        self.send(NodeMessage::Connect)
    }

    fn disconnect(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.commands.send(NodeMessage::Disconnect);
        if handle.join().is_err() {
            warn!("Engine thread panicked during shutdown");
        }
        // Anything still queued belongs to the released node
        while self.reports.try_recv().is_ok() {}
    }
}

impl Drop for WorkerNode {
    fn drop(&mut self) {
        self.disconnect();
    }
}

// ============================================================================
// Worker (engine side)
// ============================================================================

/// Source state of one node
#[derive(Debug, Default)]
struct Processor {
    sample_rate: u32,
    length: u64,
    /// Fractional source position in frames
    position: f64,
    tempo: f64,
    pitch_semitones: f64,
    epoch: u64,
    initialized: bool,
}

impl Processor {
    fn apply(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::InitializeProcessor(init) => {
                self.sample_rate = init.sample_rate;
                self.length = init.length;
                self.position = 0.0;
                self.initialized = init.sample_rate > 0;
                if self.tempo == 0.0 {
                    self.tempo = 1.0;
                }
            }
            EngineCommand::SetPipeProp { name, value } => match name {
                PipeProp::Tempo => self.tempo = value,
                PipeProp::PitchSemitones => self.pitch_semitones = value,
            },
            EngineCommand::SetFilterProp {
                name: FilterProp::SourcePosition,
                value,
                epoch,
            } => {
                self.position = value.clamp(0.0, self.length as f64);
                self.epoch = self.epoch.max(epoch);
            }
        }
    }

    fn advance(&mut self, elapsed: Duration) {
        let frames = elapsed.as_secs_f64() * self.sample_rate as f64 * self.tempo;
        self.position = (self.position + frames).min(self.length as f64);
    }

    fn report(&self) -> EngineReport {
        EngineReport::SourcePosition {
            frame_position: self.position as u64,
            epoch: self.epoch,
        }
    }
}

struct Worker {
    commands: Receiver<NodeMessage>,
    reports: Sender<EngineReport>,
    clock: PlaybackClock,
    interval: Duration,
    processor: Processor,
    connected: bool,
}

impl Worker {
    fn run(mut self) {
        let mut last_tick = Instant::now();
        let mut next_report = last_tick + self.interval;

        loop {
            let timeout = next_report.saturating_duration_since(Instant::now());
            match self.commands.recv_timeout(timeout) {
                Ok(NodeMessage::Command(command)) => self.processor.apply(command),
                Ok(NodeMessage::Connect) => self.connected = true,
                Ok(NodeMessage::Disconnect) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }

            let now = Instant::now();
            let running =
                self.connected && self.processor.initialized && !self.clock.is_suspended();
            if running {
                self.processor.advance(now - last_tick);
            }
            last_tick = now;

            if now >= next_report {
                next_report = now + self.interval;
                if running && self.reports.send(self.processor.report()).is_err() {
                    break;
                }
            }
        }

        debug!(
            "Engine node stopped at frame {:.0} (pitch {} st)",
            self.processor.position, self.processor.pitch_semitones
        );
    }
}
