//! Error handling for Varispeed
//!
//! Every fallible operation in the crate returns [`Result`]. Conditions the
//! player treats as expected UI usage (sliders moved before import, next on an
//! empty playlist) are not errors and never reach this type.

use thiserror::Error;

/// Result type alias for Varispeed operations
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Main error type for Varispeed operations
#[derive(Error, Debug)]
pub enum PlayerError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to decode audio: {reason}")]
    Decode {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Audio contains no samples")]
    EmptyAudio,

    // Engine Errors
    #[error("Failed to create processing session: {reason}")]
    SessionCreate { reason: String },

    #[error("Processing engine disconnected: {reason}")]
    EngineDisconnected { reason: String },

    #[error("Output sink error: {reason}")]
    OutputSink { reason: String },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PlayerError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            PlayerError::FileNotFound { .. } => "FILE_NOT_FOUND",
            PlayerError::Decode { .. } => "DECODE_FAILED",
            PlayerError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            PlayerError::EmptyAudio => "EMPTY_AUDIO",
            PlayerError::SessionCreate { .. } => "SESSION_CREATE_FAILED",
            PlayerError::EngineDisconnected { .. } => "ENGINE_DISCONNECTED",
            PlayerError::OutputSink { .. } => "OUTPUT_SINK",
            PlayerError::Config { .. } => "INVALID_CONFIG",
            PlayerError::Io(_) => "IO_ERROR",
            PlayerError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the player stays usable after this error
    ///
    /// Import and load failures leave the player in a consistent state (the
    /// playlist unchanged, or `Idle` with no session), so the user can simply
    /// try another file or track.
    pub fn is_recoverable(&self) -> bool {
        match self {
            PlayerError::FileNotFound { .. } => true,
            PlayerError::Decode { .. } => true,
            PlayerError::UnsupportedFormat { .. } => true,
            PlayerError::EmptyAudio => true,
            PlayerError::SessionCreate { .. } => true,
            PlayerError::EngineDisconnected { .. } => true,
            _ => false,
        }
    }

    /// Shorthand for a decode error without an underlying source
    pub fn decode(reason: impl Into<String>) -> Self {
        PlayerError::Decode {
            reason: reason.into(),
            source: None,
        }
    }
}
