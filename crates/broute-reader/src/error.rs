//! Error types for the reader.

use echonet_lite::FrameError;
use thiserror::Error;

use crate::engine::Stage;

/// Errors that can occur while commissioning or talking to the meter.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// A bounded wait used up its empty-read budget.
    #[error("timeout during {stage}")]
    Timeout {
        /// Step that was waiting.
        stage: Stage,
    },

    /// Telemetry was requested before the PAN was joined.
    #[error("not joined to a PAN")]
    NotJoined,

    /// The coordinator's MAC address cannot be turned into a link address.
    #[error("invalid coordinator address: {0}")]
    InvalidAddress(String),

    /// Frame could not be encoded or interpreted.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The transport failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings could not be parsed.
    #[error("invalid settings: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl ReaderError {
    /// Check if this is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ReaderError::Timeout { .. })
    }
}

/// Result type alias for reader operations.
pub type ReaderResult<T> = Result<T, ReaderError>;
