//! Error types for the protocol engine and output drivers
use thiserror::Error;

/// Wire decoding errors
///
/// These never escape the engine: a datagram that fails to decode is dropped.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Shorter than the fixed header or not an Art-Net packet
    #[error("Malformed Art-Net header")]
    MalformedHeader,

    /// Shorter than the fixed prefix of the packet type
    #[error("Truncated packet: expected at least {expected} bytes, got {actual}")]
    Truncated {
        /// Minimum length for this packet type
        expected: usize,
        /// Bytes received
        actual: usize,
    },
}

/// Runtime errors of the control layer
#[derive(Error, Debug)]
pub enum ControlError {
    /// Packet decoding error
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Output hardware error
    #[error("Output error: {0}")]
    OutputError(String),

    /// Serial port error
    #[error("Serial error: {0}")]
    SerialError(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] artnode_core::CoreError),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

#[cfg(feature = "serial")]
impl From<serialport::Error> for ControlError {
    fn from(err: serialport::Error) -> Self {
        ControlError::SerialError(err.to_string())
    }
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
