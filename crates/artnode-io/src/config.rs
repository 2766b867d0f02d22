//! Configuration I/O - High-level API
//!
//! Version checks and validation on top of [`ConfigFile`]; the byte-level
//! formats live in `config_format`.

use crate::config_format::{ConfigFile, CONFIG_FILE_VERSION};
use crate::error::{IoError, Result};
use artnode_core::{NodeConfig, NodeIdentity};
use std::path::Path;
use tracing::{info, warn};

/// Save `config` to `path` as a fresh config file.
pub fn save_config(config: &NodeConfig, path: &Path) -> Result<()> {
    let mut file = ConfigFile::new(config.clone());
    file.save(path)
}

/// Load and validate the configuration stored at `path`.
///
/// Files written by a different format version are rejected.
pub fn load_config(path: &Path) -> Result<NodeConfig> {
    let file = ConfigFile::load(path)?;

    if file.version != CONFIG_FILE_VERSION {
        return Err(IoError::VersionMismatch {
            expected: CONFIG_FILE_VERSION.to_string(),
            found: file.version,
        });
    }

    file.config.validate()?;
    Ok(file.config)
}

/// Load `path`, writing the default configuration there first if it is missing.
///
/// Returns the configuration and whether it was just created.
pub fn load_or_create(path: &Path) -> Result<(NodeConfig, bool)> {
    if path.exists() {
        return load_config(path).map(|config| (config, false));
    }

    let config = NodeConfig::default();
    save_config(&config, path)?;
    info!("Wrote default configuration to {}", path.display());
    Ok((config, true))
}

/// Replace the stored identity, keeping the rest of the file as is.
///
/// Used to persist changes made remotely over the network. If the file is
/// missing or unreadable, a new one is written from `fallback`.
pub fn persist_identity(path: &Path, identity: &NodeIdentity, fallback: &NodeConfig) -> Result<()> {
    let mut file = match ConfigFile::load(path) {
        Ok(file) => file,
        Err(e) => {
            warn!(
                "Could not reload {} ({}), rewriting it from the running configuration",
                path.display(),
                e
            );
            ConfigFile::new(fallback.clone())
        }
    };

    file.config.identity = identity.clone();
    file.save(path)?;
    info!(
        "Persisted identity '{}' ({}) to {}",
        identity.short_name,
        identity.address(),
        path.display()
    );
    Ok(())
}
