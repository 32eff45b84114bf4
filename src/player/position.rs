//! Timeline position tracking
//!
//! Seeks and engine reports race each other: a report produced just before a
//! scrub can arrive just after it. Every scrub bumps the seek epoch, the
//! engine tags reports with the newest epoch it has received, and reports
//! from an older epoch are dropped here.

use serde::Serialize;
use tracing::trace;

use crate::engine::proxy::ProcessingEngineProxy;
use crate::error::Result;

/// Format seconds as `m:ss`
///
/// # Example
/// ```
/// use varispeed::player::format_time;
/// assert_eq!(format_time(0.0), "0:00");
/// assert_eq!(format_time(125.9), "2:05");
/// ```
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// The authoritative playback position
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimelinePosition {
    pub seconds: f64,
    pub seek_epoch: u64,
}

/// Timeline as rendered: current time, total time and slider position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineDisplay {
    pub current: String,
    pub total: String,
    /// Slider position in [0, 100]
    pub percent: f64,
}

impl Default for TimelineDisplay {
    fn default() -> Self {
        Self {
            current: format_time(0.0),
            total: format_time(0.0),
            percent: 0.0,
        }
    }
}

impl std::fmt::Display for TimelineDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.current, self.total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TrackContext {
    total_frames: u64,
    sample_rate: u32,
}

impl TrackContext {
    fn duration_secs(&self) -> f64 {
        self.total_frames as f64 / self.sample_rate as f64
    }
}

/// Reconciles user seeks with engine position reports
#[derive(Debug, Clone, Default)]
pub struct PositionTracker {
    seek_epoch: u64,
    last_seconds: f64,
    track: Option<TrackContext>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a newly loaded track from zero
    ///
    /// The epoch restarts at 0 along with the new engine session.
    pub fn reset(&mut self, total_frames: u64, sample_rate: u32) {
        self.seek_epoch = 0;
        self.last_seconds = 0.0;
        self.track = (sample_rate > 0).then_some(TrackContext {
            total_frames,
            sample_rate,
        });
    }

    /// Forget the current track
    pub fn clear(&mut self) {
        self.seek_epoch = 0;
        self.last_seconds = 0.0;
        self.track = None;
    }

    /// Apply a user scrub to `fraction` of the track
    ///
    /// Sends the seek to the engine and moves the displayed position at once,
    /// without waiting for a report. Returns None when no track is loaded.
    pub fn on_seek(
        &mut self,
        fraction: f64,
        duration_secs: f64,
        proxy: &mut ProcessingEngineProxy,
    ) -> Result<Option<TimelineDisplay>> {
        let Some(track) = self.track else {
            return Ok(None);
        };
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };

        self.seek_epoch += 1;
        proxy.seek(fraction * track.total_frames as f64, self.seek_epoch)?;
        self.last_seconds = fraction * duration_secs;

        Ok(Some(self.display()))
    }

    /// Apply an engine report
    ///
    /// Returns None when the report predates the latest seek or no track is
    /// loaded; the position is then left untouched.
    pub fn on_engine_report(
        &mut self,
        frame_position: u64,
        sample_rate: u32,
        report_epoch: u64,
    ) -> Option<TimelineDisplay> {
        if report_epoch < self.seek_epoch {
            trace!(
                "Discarding stale report (epoch {} < {})",
                report_epoch,
                self.seek_epoch
            );
            return None;
        }
        if self.track.is_none() || sample_rate == 0 {
            return None;
        }

        self.last_seconds = frame_position as f64 / sample_rate as f64;
        Some(self.display())
    }

    pub fn position(&self) -> TimelinePosition {
        TimelinePosition {
            seconds: self.last_seconds,
            seek_epoch: self.seek_epoch,
        }
    }

    pub fn seek_epoch(&self) -> u64 {
        self.seek_epoch
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.track.map(|t| t.sample_rate)
    }

    /// Formatted timeline for the current position
    pub fn display(&self) -> TimelineDisplay {
        let Some(track) = self.track else {
            return TimelineDisplay::default();
        };

        let duration = track.duration_secs();
        let percent = if duration > 0.0 {
            (self.last_seconds / duration * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        TimelineDisplay {
            current: format_time(self.last_seconds),
            total: format_time(duration),
            percent,
        }
    }
}
