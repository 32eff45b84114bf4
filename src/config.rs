//! Player configuration
//!
//! Loaded from a JSON file. Every field has a default, so a partial file (or
//! no file at all) is valid.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PlayerError, Result};

/// Default artist for imported local files
const DEFAULT_ARTIST: &str = "Local File";

/// Default engine report cadence in milliseconds
const DEFAULT_REPORT_INTERVAL_MS: u64 = 50;

/// Default tracing filter for the CLI
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Artist assigned to tracks imported from files
    pub default_artist: String,

    /// Pitch applied before the first slider move, in semitones
    pub initial_pitch: i32,

    /// Tempo applied before the first slider move
    pub initial_tempo: f64,

    /// How often the threaded engine reports its position
    pub report_interval_ms: u64,

    /// `tracing` filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_artist: DEFAULT_ARTIST.to_string(),
            initial_pitch: 0,
            initial_tempo: 1.0,
            report_interval_ms: DEFAULT_REPORT_INTERVAL_MS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl PlayerConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PlayerError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PlayerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the player cannot work with
    ///
    /// Out-of-range pitch and tempo are not errors; the parameter store clamps
    /// them like any other input.
    pub fn validate(&self) -> Result<()> {
        if self.report_interval_ms == 0 {
            return Err(PlayerError::Config {
                reason: "report_interval_ms must be at least 1".into(),
            });
        }
        if !self.initial_tempo.is_finite() {
            return Err(PlayerError::Config {
                reason: format!("initial_tempo must be finite, got {}", self.initial_tempo),
            });
        }
        Ok(())
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::default();
        assert_eq!(config.default_artist, "Local File");
        assert_eq!(config.initial_pitch, 0);
        assert_eq!(config.initial_tempo, 1.0);
        assert_eq!(config.report_interval(), Duration::from_millis(50));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = PlayerConfig::from_json_str(r#"{"initial_tempo": 1.5}"#).unwrap();
        assert_eq!(config.initial_tempo, 1.5);
        assert_eq!(config.default_artist, "Local File");
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = PlayerConfig::from_json_str(r#"{"report_interval_ms": 0}"#);
        assert!(matches!(result, Err(PlayerError::Config { .. })));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let result = PlayerConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(PlayerError::Serialization(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_artist": "Field Recording", "initial_pitch": -2}}"#).unwrap();

        let config = PlayerConfig::load(file.path()).unwrap();
        assert_eq!(config.default_artist, "Field Recording");
        assert_eq!(config.initial_pitch, -2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = PlayerConfig::load(Path::new("/nonexistent/varispeed.json"));
        assert!(matches!(result, Err(PlayerError::FileNotFound { .. })));
    }
}
