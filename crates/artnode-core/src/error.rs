//! Error types for node configuration
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Identity fields out of range
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    /// MAC address could not be parsed
    #[error("Invalid MAC address: {0}")]
    InvalidMac(String),

    /// Serial output timing violates the DMX512 minimums
    #[error("Invalid DMX timing: {0}")]
    InvalidTiming(String),

    /// Output configuration is inconsistent
    #[error("Invalid output configuration: {0}")]
    InvalidOutput(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
