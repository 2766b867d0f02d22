//! Error types for configuration persistence.

/// Result type alias for configuration I/O.
pub type Result<T> = std::result::Result<T, IoError>;

/// Errors raised while reading or writing configuration files.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// RON parse error
    #[error("RON parse error: {0}")]
    RonDe(#[from] ron::error::SpannedError),

    /// RON serialization error
    #[error("RON serialization error: {0}")]
    RonSer(#[from] ron::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// File extension not recognised
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// File written by an incompatible version
    #[error("Config version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version this build reads
        expected: String,
        /// Version stored in the file
        found: String,
    },

    /// File exceeds the load limit
    #[error("Config file too large: {size} bytes (limit {limit})")]
    FileTooLarge {
        /// Actual size in bytes
        size: u64,
        /// Maximum accepted size in bytes
        limit: u64,
    },

    /// Loaded configuration failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] artnode_core::CoreError),
}
