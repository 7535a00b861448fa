//! Frame error types.

use thiserror::Error;

/// Errors that can occur when encoding or decoding ECHONET Lite frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Frame ended before a declared field or property was complete.
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Bytes needed to finish the current field.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// Property data does not fit the single-byte PDC field.
    #[error("property 0x{epc:02X} data too long: maximum 255 bytes, got {len}")]
    PropertyTooLong {
        /// Property code.
        epc: u8,
        /// Length of the offending data.
        len: usize,
    },

    /// More properties than the single-byte OPC field can count.
    #[error("too many properties: maximum 255, got {0}")]
    TooManyProperties(usize),

    /// Frame text was not valid hex.
    #[error("invalid hex frame: {0}")]
    InvalidHex(String),

    /// A response did not carry the requested property.
    #[error("property 0x{0:02X} missing from frame")]
    MissingProperty(u8),

    /// Property data could not be interpreted as a value.
    #[error("property 0x{epc:02X} has unusable data length {len}")]
    InvalidPropertyValue {
        /// Property code.
        epc: u8,
        /// Length of the property data.
        len: usize,
    },
}

impl From<hex::FromHexError> for FrameError {
    fn from(err: hex::FromHexError) -> Self {
        FrameError::InvalidHex(err.to_string())
    }
}

/// Result type alias for frame operations.
pub type FrameResult<T> = Result<T, FrameError>;
