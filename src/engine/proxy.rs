//! Processing engine proxy
//!
//! Owns the single live [`EngineSession`] and mediates every command and
//! report crossing the engine boundary. Opening a session always releases the
//! previous one first, so at most one processing node is ever connected.

use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::engine::node::{EngineFactory, OutputSink, ProcessingNode};
use crate::engine::protocol::{
    EngineCommand, FilterProp, InitializeProcessor, PipeProp, PositionReport,
};
use crate::error::Result;
use crate::player::params::ParameterSnapshot;
use crate::player::playlist::Track;

/// Observer invoked for every position report from the live session
pub type ReportCallback = Box<dyn FnMut(&PositionReport) + Send>;

/// One live binding of the engine to one loaded track
pub struct EngineSession {
    id: Uuid,
    node: Box<dyn ProcessingNode>,
    sample_rate: u32,
    length_in_frames: u64,
}

impl EngineSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn length_in_frames(&self) -> u64 {
        self.length_in_frames
    }
}

/// Typed command/report channel to the realtime engine
pub struct ProcessingEngineProxy {
    factory: Box<dyn EngineFactory>,
    sink: Box<dyn OutputSink>,
    session: Option<EngineSession>,
    observers: Vec<ReportCallback>,
}

impl ProcessingEngineProxy {
    pub fn new(factory: Box<dyn EngineFactory>, sink: Box<dyn OutputSink>) -> Self {
        Self {
            factory,
            sink,
            session: None,
            observers: Vec::new(),
        }
    }

    /// Bind a new session to `track`
    ///
    /// Any existing session is closed first. The new node is initialized with
    /// the track's samples, receives the current parameters, is connected to
    /// the sink, and the sink is resumed if it was suspended. On error no
    /// session is left open.
    pub fn open(&mut self, track: &Track, params: ParameterSnapshot) -> Result<&EngineSession> {
        self.close();

        let mut node = self.factory.create_node()?;
        let buffer = track.samples();
        let (channel0, channel1) = buffer.stereo_pair();
        let init = InitializeProcessor {
            sample_rate: buffer.sample_rate(),
            length: buffer.frames() as u64,
            channel0: channel0.to_vec(),
            channel1: channel1.to_vec(),
        };

        if let Err(e) = Self::initialize(node.as_mut(), init, params)
            .and_then(|_| node.connect())
            .and_then(|_| self.ensure_running())
        {
            warn!("Failed to open session for '{}': {}", track.title(), e);
            node.disconnect();
            return Err(e);
        }

        let session = EngineSession {
            id: Uuid::new_v4(),
            node,
            sample_rate: buffer.sample_rate(),
            length_in_frames: buffer.frames() as u64,
        };
        info!(
            session = %session.id,
            "Opened session for '{}' ({} frames @ {} Hz)",
            track.title(),
            session.length_in_frames,
            session.sample_rate
        );

        Ok(self.session.insert(session))
    }

    fn initialize(
        node: &mut dyn ProcessingNode,
        init: InitializeProcessor,
        params: ParameterSnapshot,
    ) -> Result<()> {
        node.post_message(EngineCommand::InitializeProcessor(init))?;
        node.post_message(EngineCommand::SetPipeProp {
            name: PipeProp::PitchSemitones,
            value: params.pitch_semitones as f64,
        })?;
        node.post_message(EngineCommand::SetPipeProp {
            name: PipeProp::Tempo,
            value: params.tempo_ratio,
        })
    }

    fn ensure_running(&mut self) -> Result<()> {
        if self.sink.is_suspended() {
            debug!("Output sink suspended, resuming before playback");
            self.sink.resume()?;
        }
        Ok(())
    }

    /// Forward a live parameter update; ignored when no session is open
    pub fn send_parameter(&mut self, name: PipeProp, value: f64) -> Result<()> {
        match self.session.as_mut() {
            Some(session) => {
                debug!(session = %session.id, "SET_PIPE_PROP {} = {}", name.as_str(), value);
                session
                    .node
                    .post_message(EngineCommand::SetPipeProp { name, value })
            }
            None => {
                debug!("No session, {} = {} kept in store only", name.as_str(), value);
                Ok(())
            }
        }
    }

    /// Override the source position; ignored when no session is open
    pub fn seek(&mut self, frame_offset: f64, epoch: u64) -> Result<()> {
        match self.session.as_mut() {
            Some(session) => {
                debug!(session = %session.id, epoch, "Seek to frame {:.0}", frame_offset);
                session.node.post_message(EngineCommand::SetFilterProp {
                    name: FilterProp::SourcePosition,
                    value: frame_offset,
                    epoch,
                })
            }
            None => Ok(()),
        }
    }

    /// Register an observer for position reports
    pub fn on_position_report(&mut self, callback: ReportCallback) {
        self.observers.push(callback);
    }

    /// Deliver every report the live session has produced so far
    ///
    /// Never blocks. Observers run before the reports are returned.
    pub fn pump_reports(&mut self) -> Vec<PositionReport> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };

        let mut reports = Vec::new();
        while let Some(report) = session.node.try_recv_report() {
            let report = PositionReport::from(report);
            trace!(session = %session.id, "SOURCEPOSITION {} (epoch {})", report.frame_position, report.epoch);
            for observer in self.observers.iter_mut() {
                observer(&report);
            }
            reports.push(report);
        }
        reports
    }

    /// Disconnect and release the live session, if any
    pub fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.node.disconnect();
            info!(session = %session.id, "Closed session");
        }
    }

    pub fn session(&self) -> Option<&EngineSession> {
        self.session.as_ref()
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_output_suspended(&self) -> bool {
        self.sink.is_suspended()
    }

    pub fn suspend_output(&mut self) -> Result<()> {
        self.sink.suspend()
    }

    pub fn resume_output(&mut self) -> Result<()> {
        self.sink.resume()
    }
}

impl Drop for ProcessingEngineProxy {
    fn drop(&mut self) {
        self.close();
    }
}
