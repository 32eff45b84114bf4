//! Transport State Machine for Varispeed
//!
//! The controller owns the playlist, the parameters, the engine proxy and the
//! position tracker, and is the only way to change any of them. Commands run
//! one at a time on the caller's thread; engine reports are delivered into
//! the same flow by [`TransportController::pump_engine_reports`].

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PlayerConfig;
use crate::engine::node::{DecodeService, EngineFactory, OutputSink};
use crate::engine::protocol::PipeProp;
use crate::engine::proxy::{ProcessingEngineProxy, ReportCallback};
use crate::error::Result;
use crate::player::params::{ParameterSnapshot, ParameterStore};
use crate::player::playlist::{Playlist, Track};
use crate::player::position::{PositionTracker, TimelineDisplay, TimelinePosition};
use crate::player::view::{PlayerView, PlaylistEntry, NO_TRACK_HINT, NO_TRACK_TITLE};

/// Observer invoked for every timeline change
pub type TimelineCallback = Box<dyn FnMut(&TimelineDisplay) + Send>;

/// Transport states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TransportState {
    /// No track loaded (default state)
    #[default]
    Idle,
    /// A track is loaded and the output clock runs
    Playing,
    /// A track is loaded and the output clock is suspended
    Paused,
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportState::Idle => write!(f, "Idle"),
            TransportState::Playing => write!(f, "Playing"),
            TransportState::Paused => write!(f, "Paused"),
        }
    }
}

/// Top-level playback controller
///
/// # Example
/// ```
/// use varispeed::engine::{generate_test_tone, MockEngine, MockSink, WavDecoder};
/// use varispeed::player::{Track, TransportController, TransportState};
/// use varispeed::PlayerConfig;
///
/// let mut player = TransportController::new(
///     Box::new(MockEngine::new()),
///     Box::new(MockSink::suspended()),
///     Box::new(WavDecoder::new()),
///     &PlayerConfig::default(),
/// );
/// assert_eq!(player.state(), TransportState::Idle);
///
/// player.import(Track::new("A", "Local File", generate_test_tone(440.0, 1.0, 8000))).unwrap();
/// assert_eq!(player.state(), TransportState::Playing);
///
/// player.toggle_play().unwrap();
/// assert_eq!(player.state(), TransportState::Paused);
/// ```
pub struct TransportController {
    state: TransportState,
    playlist: Playlist,
    params: ParameterStore,
    proxy: ProcessingEngineProxy,
    tracker: PositionTracker,
    decoder: Box<dyn DecodeService>,
    default_artist: String,
    timeline_observers: Vec<TimelineCallback>,
}

impl TransportController {
    /// Create an idle controller with injected collaborators
    pub fn new(
        factory: Box<dyn EngineFactory>,
        sink: Box<dyn OutputSink>,
        decoder: Box<dyn DecodeService>,
        config: &PlayerConfig,
    ) -> Self {
        Self {
            state: TransportState::Idle,
            playlist: Playlist::new(),
            params: ParameterStore::with_initial(config.initial_pitch, config.initial_tempo),
            proxy: ProcessingEngineProxy::new(factory, sink),
            tracker: PositionTracker::new(),
            decoder,
            default_artist: config.default_artist.clone(),
            timeline_observers: Vec::new(),
        }
    }

    // ========================================================================
    // Import & Load
    // ========================================================================

    /// Append a decoded track and start playing it
    ///
    /// State transition: Any -> Playing
    pub fn import(&mut self, track: Track) -> Result<()> {
        info!("Imported '{}'", track.title());
        self.playlist.append(track);
        let last = self.playlist.len() as isize - 1;
        self.load(last)
    }

    /// Decode raw file bytes, then [`import`](Self::import) the result
    ///
    /// On decode failure the playlist is left unchanged.
    pub fn import_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let samples = self.decoder.decode(bytes, Some(name)).map_err(|e| {
            warn!("Failed to import '{}': {}", name, e);
            e
        })?;
        let track = Track::new(name, self.default_artist.clone(), samples);
        self.import(track)
    }

    /// Load the track at `index` and start playing it
    ///
    /// The index wraps: below zero selects the last track, past the end the
    /// first. A fresh engine session is opened even when the same track is
    /// reloaded. No-op on an empty playlist.
    ///
    /// State transition: Any -> Playing, or Idle if the session cannot open
    pub fn load(&mut self, index: isize) -> Result<()> {
        let Some(index) = self.playlist.select(index) else {
            debug!("[TRANSPORT] Load ignored, playlist is empty");
            return Ok(());
        };

        let Some(track) = self.playlist.get(index) else {
            return Ok(());
        };

        let opened = self
            .proxy
            .open(track, self.params.snapshot())
            .map(|session| (session.length_in_frames(), session.sample_rate()));

        match opened {
            Ok((frames, rate)) => {
                self.tracker.reset(frames, rate);
                self.state = TransportState::Playing;
                info!("[TRANSPORT] Playing '{}' (#{})", track.title(), index);

                let display = self.tracker.display();
                self.notify_timeline(&display);
                Ok(())
            }
            Err(e) => {
                warn!("[TRANSPORT] Load of '{}' failed: {}", track.title(), e);
                self.tracker.clear();
                self.state = TransportState::Idle;
                Err(e)
            }
        }
    }

    /// Load the following track, wrapping to the first
    pub fn next(&mut self) -> Result<()> {
        if self.playlist.is_empty() {
            return Ok(());
        }
        self.load(self.playlist.current_index() as isize + 1)
    }

    /// Load the preceding track, wrapping to the last
    pub fn prev(&mut self) -> Result<()> {
        if self.playlist.is_empty() {
            return Ok(());
        }
        self.load(self.playlist.current_index() as isize - 1)
    }

    // ========================================================================
    // Transport Controls
    // ========================================================================

    /// Suspend or resume the output clock
    ///
    /// State transitions:
    /// - Playing -> Paused
    /// - Paused -> Playing
    /// - Idle -> Idle (no-op)
    pub fn toggle_play(&mut self) -> Result<()> {
        match self.state {
            TransportState::Playing => {
                self.proxy.suspend_output()?;
                self.state = TransportState::Paused;
                debug!("[TRANSPORT] Paused at {:.3}s", self.tracker.position().seconds);
            }
            TransportState::Paused => {
                self.proxy.resume_output()?;
                self.state = TransportState::Playing;
                debug!("[TRANSPORT] Resumed at {:.3}s", self.tracker.position().seconds);
            }
            TransportState::Idle => {
                debug!("[TRANSPORT] Toggle ignored, nothing loaded");
            }
        }
        Ok(())
    }

    /// Seek to `fraction` (0.0 to 1.0) of the current track
    ///
    /// Leaves Playing/Paused unchanged. No-op while Idle.
    pub fn scrub(&mut self, fraction: f64) -> Result<()> {
        if self.state == TransportState::Idle {
            return Ok(());
        }
        let Some(duration) = self.playlist.current().map(Track::duration_secs) else {
            return Ok(());
        };

        if let Some(display) = self.tracker.on_seek(fraction, duration, &mut self.proxy)? {
            self.notify_timeline(&display);
        }
        Ok(())
    }

    /// Set the pitch shift and forward it to the engine
    ///
    /// Returns the clamped value. Legal in every state.
    pub fn set_pitch(&mut self, semitones: i32) -> Result<i32> {
        let pitch = self.params.set_pitch(semitones);
        self.proxy
            .send_parameter(PipeProp::PitchSemitones, pitch as f64)?;
        Ok(pitch)
    }

    /// Set the tempo ratio and forward it to the engine
    ///
    /// Returns the clamped value. Legal in every state.
    pub fn set_tempo(&mut self, ratio: f64) -> Result<f64> {
        let tempo = self.params.set_tempo(ratio);
        self.proxy.send_parameter(PipeProp::Tempo, tempo)?;
        Ok(tempo)
    }

    // ========================================================================
    // Engine Reports
    // ========================================================================

    /// Route every pending engine report through the position tracker
    ///
    /// Returns how many reports updated the timeline; stale ones are dropped.
    pub fn pump_engine_reports(&mut self) -> usize {
        let Some(sample_rate) = self.tracker.sample_rate() else {
            return 0;
        };

        let mut applied = 0;
        for report in self.proxy.pump_reports() {
            if let Some(display) =
                self.tracker
                    .on_engine_report(report.frame_position, sample_rate, report.epoch)
            {
                self.notify_timeline(&display);
                applied += 1;
            }
        }
        applied
    }

    /// Register an observer for timeline changes
    pub fn on_timeline(&mut self, callback: TimelineCallback) {
        self.timeline_observers.push(callback);
    }

    /// Register an observer for raw engine position reports
    pub fn on_position_report(&mut self, callback: ReportCallback) {
        self.proxy.on_position_report(callback);
    }

    fn notify_timeline(&mut self, display: &TimelineDisplay) {
        for observer in self.timeline_observers.iter_mut() {
            observer(display);
        }
    }

    /// Close the engine session and return to Idle
    pub fn shutdown(&mut self) {
        self.proxy.close();
        self.tracker.clear();
        self.state = TransportState::Idle;
    }

    // ========================================================================
    // State Queries
    // ========================================================================

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.state == TransportState::Paused
    }

    pub fn is_idle(&self) -> bool {
        self.state == TransportState::Idle
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn parameters(&self) -> ParameterSnapshot {
        self.params.snapshot()
    }

    pub fn position(&self) -> TimelinePosition {
        self.tracker.position()
    }

    pub fn timeline(&self) -> TimelineDisplay {
        self.tracker.display()
    }

    pub fn proxy(&self) -> &ProcessingEngineProxy {
        &self.proxy
    }

    /// Everything a renderer needs
    pub fn view(&self) -> PlayerView {
        let loaded = self.playlist.current().filter(|_| !self.is_idle());
        let (title, artist) = match loaded {
            Some(track) => (track.title().to_string(), track.artist().to_string()),
            None => (NO_TRACK_TITLE.to_string(), NO_TRACK_HINT.to_string()),
        };
        let params = self.params.snapshot();

        PlayerView {
            state: self.state,
            title,
            artist,
            is_playing: self.is_playing(),
            pitch_label: params.pitch_label(),
            tempo_label: params.tempo_label(),
            timeline: self.tracker.display(),
            playlist: self
                .playlist
                .iter()
                .enumerate()
                .map(|(index, track)| PlaylistEntry {
                    index,
                    title: track.title().to_string(),
                    active: index == self.playlist.current_index(),
                })
                .collect(),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::buffer::generate_test_tone;
    use crate::engine::decode::WavDecoder;
    use crate::engine::mock::{MockEngine, MockSink};
    use crate::engine::protocol::EngineCommand;

    fn controller() -> (TransportController, MockEngine, MockSink) {
        let engine = MockEngine::new();
        let sink = MockSink::suspended();
        let player = TransportController::new(
            Box::new(engine.clone()),
            Box::new(sink.clone()),
            Box::new(WavDecoder::new()),
            &PlayerConfig::default(),
        );
        (player, engine, sink)
    }

    fn tone(title: &str) -> Track {
        Track::new(title, "Local File", generate_test_tone(440.0, 1.0, 8000))
    }

    // ------------------------------------------------------------------------
    // Basic State Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_default_state_is_idle() {
        let (player, _, _) = controller();
        assert!(player.is_idle());
        assert!(!player.is_playing());
        assert_eq!(player.state(), TransportState::Idle);
        assert_eq!(player.timeline().to_string(), "0:00 / 0:00");
    }

    #[test]
    fn test_transport_state_display() {
        assert_eq!(format!("{}", TransportState::Idle), "Idle");
        assert_eq!(format!("{}", TransportState::Playing), "Playing");
        assert_eq!(format!("{}", TransportState::Paused), "Paused");
    }

    // ------------------------------------------------------------------------
    // State Transition Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_import_starts_playing() {
        let (mut player, engine, sink) = controller();
        player.import(tone("A")).unwrap();

        assert!(player.is_playing());
        assert!(!sink.is_suspended());
        assert_eq!(engine.live_sessions(), 1);
    }

    #[test]
    fn test_playing_to_paused_and_back() {
        let (mut player, _, sink) = controller();
        player.import(tone("A")).unwrap();

        player.toggle_play().unwrap();
        assert!(player.is_paused());
        assert!(sink.is_suspended());

        player.toggle_play().unwrap();
        assert!(player.is_playing());
        assert!(!sink.is_suspended());
    }

    #[test]
    fn test_toggle_while_idle_is_noop() {
        let (mut player, _, sink) = controller();
        player.toggle_play().unwrap();
        assert!(player.is_idle());
        assert_eq!(sink.suspend_calls() + sink.resume_calls(), 0);
    }

    #[test]
    fn test_load_from_paused_plays() {
        let (mut player, _, _) = controller();
        player.import(tone("A")).unwrap();
        player.import(tone("B")).unwrap();
        player.toggle_play().unwrap();

        player.load(0).unwrap();
        assert!(player.is_playing());
        assert_eq!(player.playlist().current_index(), 0);
    }

    #[test]
    fn test_scrub_keeps_pause() {
        let (mut player, _, _) = controller();
        player.import(tone("A")).unwrap();
        player.toggle_play().unwrap();

        player.scrub(0.25).unwrap();
        assert!(player.is_paused());
        assert_eq!(player.position().seek_epoch, 1);
    }

    #[test]
    fn test_scrub_while_idle_is_noop() {
        let (mut player, engine, _) = controller();
        player.scrub(0.5).unwrap();
        assert_eq!(player.position().seek_epoch, 0);
        assert_eq!(engine.sessions_created(), 0);
    }

    #[test]
    fn test_navigation_on_empty_playlist() {
        let (mut player, engine, _) = controller();
        player.next().unwrap();
        player.prev().unwrap();
        player.load(3).unwrap();
        assert!(player.is_idle());
        assert_eq!(engine.sessions_created(), 0);
    }

    // ------------------------------------------------------------------------
    // Parameter Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_parameters_before_import_are_buffered() {
        let (mut player, engine, _) = controller();
        assert_eq!(player.set_pitch(5).unwrap(), 5);
        assert_eq!(player.set_tempo(3.0).unwrap(), 2.0);

        player.import(tone("A")).unwrap();
        let commands = engine.last_commands();
        assert!(commands.contains(&EngineCommand::SetPipeProp {
            name: PipeProp::PitchSemitones,
            value: 5.0
        }));
        assert!(commands.contains(&EngineCommand::SetPipeProp {
            name: PipeProp::Tempo,
            value: 2.0
        }));
    }

    #[test]
    fn test_parameters_forwarded_live() {
        let (mut player, engine, _) = controller();
        player.import(tone("A")).unwrap();
        assert_eq!(player.set_pitch(-20).unwrap(), -12);

        assert_eq!(
            engine.last_commands().last(),
            Some(&EngineCommand::SetPipeProp {
                name: PipeProp::PitchSemitones,
                value: -12.0
            })
        );
    }

    #[test]
    fn test_parameters_survive_track_switch() {
        let (mut player, engine, _) = controller();
        player.import(tone("A")).unwrap();
        player.import(tone("B")).unwrap();
        player.set_tempo(0.75).unwrap();

        player.prev().unwrap();
        assert!(engine.last_commands().contains(&EngineCommand::SetPipeProp {
            name: PipeProp::Tempo,
            value: 0.75
        }));
    }

    // ------------------------------------------------------------------------
    // Failure Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_session_failure_leaves_idle() {
        let (mut player, engine, _) = controller();
        player.import(tone("A")).unwrap();
        engine.fail_next_create();

        assert!(player.next().is_err());
        assert!(player.is_idle());
        assert!(!player.proxy().has_session());
        assert_eq!(engine.live_sessions(), 0);

        // Recovery: loading again works
        player.load(0).unwrap();
        assert!(player.is_playing());
    }

    #[test]
    fn test_import_bytes_decode_failure() {
        let (mut player, _, _) = controller();
        assert!(player.import_bytes("broken.wav", b"RIFF....").is_err());
        assert!(player.playlist().is_empty());
        assert!(player.is_idle());
    }

    // ------------------------------------------------------------------------
    // View Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_view_before_import() {
        let (player, _, _) = controller();
        let view = player.view();
        assert_eq!(view.title, NO_TRACK_TITLE);
        assert_eq!(view.artist, NO_TRACK_HINT);
        assert!(view.playlist.is_empty());
        assert_eq!(view.tempo_label, "1.00x");
    }

    #[test]
    fn test_view_marks_active_entry() {
        let (mut player, _, _) = controller();
        player.import(tone("A")).unwrap();
        player.import(tone("B")).unwrap();

        let view = player.view();
        assert_eq!(view.title, "B");
        assert_eq!(view.artist, "Local File");
        assert!(view.is_playing);
        assert_eq!(
            view.playlist.iter().map(|e| e.active).collect::<Vec<_>>(),
            vec![false, true]
        );
    }

    #[test]
    fn test_shutdown_closes_session() {
        let (mut player, engine, _) = controller();
        player.import(tone("A")).unwrap();
        player.shutdown();
        assert!(player.is_idle());
        assert_eq!(engine.live_sessions(), 0);
    }
}
