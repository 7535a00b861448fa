//! Error types for the SKSTACK protocol.

use thiserror::Error;

/// Errors that can occur when working with the SKSTACK protocol.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SkError {
    /// Failed to parse a line from the modem.
    #[error("failed to parse line: {0}")]
    ParseError(String),
}

/// Result type alias for SKSTACK operations.
pub type SkResult<T> = Result<T, SkError>;
