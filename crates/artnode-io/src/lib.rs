//! ArtNode IO - configuration persistence
//!
//! Stores [`artnode_core::NodeConfig`] on disk as RON (default), JSON or TOML,
//! wrapped in a versioned [`ConfigFile`].
//!
//! ```rust,no_run
//! use artnode_io::{load_config, save_config};
//! use artnode_core::NodeConfig;
//! use std::path::Path;
//!
//! let path = Path::new("artnode.ron");
//! save_config(&NodeConfig::default(), path)?;
//! let config = load_config(path)?;
//! # Ok::<(), artnode_io::IoError>(())
//! ```

pub mod config;
pub mod config_format;
pub mod error;

pub use config::{load_config, load_or_create, persist_identity, save_config};
pub use config_format::{
    ConfigFile, ConfigFormat, ConfigMetadata, CONFIG_FILE_VERSION, MAX_CONFIG_FILE_SIZE,
};
pub use error::{IoError, Result};
