//! On-disk configuration file format.
//!
//! The node configuration is wrapped in a [`ConfigFile`] carrying a format
//! version and timestamps, and stored as RON, JSON or TOML depending on the
//! file extension.

use crate::error::{IoError, Result};
use artnode_core::NodeConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Format version stamped into saved files.
pub const CONFIG_FILE_VERSION: &str = "1.0.0";

/// Largest configuration file accepted on load (1 MB).
pub const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Serialization format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Ron,
    Json,
    Toml,
}

impl ConfigFormat {
    /// Format for `path`; files without an extension are RON.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("ron");

        match extension {
            "ron" => Ok(Self::Ron),
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            other => Err(IoError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Top-level structure of a saved configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigFile {
    /// Format version
    pub version: String,
    /// Timestamps
    pub metadata: ConfigMetadata,
    /// The node configuration
    pub config: NodeConfig,
}

/// Timestamps of a configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigMetadata {
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl ConfigFile {
    /// Wrap `config`, stamping both timestamps with now.
    pub fn new(config: NodeConfig) -> Self {
        let now = Utc::now();
        Self {
            version: CONFIG_FILE_VERSION.to_string(),
            metadata: ConfigMetadata {
                created_at: now,
                modified_at: now,
            },
            config,
        }
    }

    /// Load from `path` with the default size limit.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_limit(path, MAX_CONFIG_FILE_SIZE)
    }

    /// Load from `path`, refusing files larger than `limit` bytes.
    pub fn load_with_limit(path: &Path, limit: u64) -> Result<Self> {
        let size = fs::metadata(path)?.len();
        if size > limit {
            return Err(IoError::FileTooLarge { size, limit });
        }

        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path)?;

        let file: ConfigFile = match format {
            ConfigFormat::Ron => ron::from_str(&content)?,
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };
        Ok(file)
    }

    /// Save to `path`, updating `modified_at`.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        let format = ConfigFormat::from_path(path)?;
        self.metadata.modified_at = Utc::now();

        let content = match format {
            ConfigFormat::Ron => {
                ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?
            }
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("node.ron")).unwrap(),
            ConfigFormat::Ron
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("node")).unwrap(),
            ConfigFormat::Ron
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("node.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert!(matches!(
            ConfigFormat::from_path(Path::new("node.yaml")),
            Err(IoError::UnsupportedFormat(ext)) if ext == "yaml"
        ));
    }

    #[test]
    fn test_config_file_ron_roundtrip() {
        let mut file = ConfigFile::new(NodeConfig::default());
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().with_extension("ron");

        file.save(&path).unwrap();
        let loaded = ConfigFile::load(&path).unwrap();

        assert_eq!(loaded.version, CONFIG_FILE_VERSION);
        assert_eq!(loaded.config, file.config);
        assert_eq!(loaded.metadata.created_at, file.metadata.created_at);
    }

    #[test]
    fn test_modified_at_updates_on_save() {
        let mut file = ConfigFile::new(NodeConfig::default());
        let first = file.metadata.modified_at;
        std::thread::sleep(std::time::Duration::from_millis(10));

        let tmp = NamedTempFile::new().unwrap();
        file.save(&tmp.path().with_extension("json")).unwrap();
        assert!(file.metadata.modified_at > first);
    }

    #[test]
    fn test_load_file_too_large() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().with_extension("ron");
        let mut out = fs::File::create(&path).unwrap();
        out.write_all(&vec![b' '; 1024]).unwrap();

        let result = ConfigFile::load_with_limit(&path, 500);
        match result {
            Err(IoError::FileTooLarge { size, limit }) => {
                assert_eq!(size, 1024);
                assert_eq!(limit, 500);
            }
            other => panic!("expected FileTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_reports_parse_error() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().with_extension("json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(ConfigFile::load(&path), Err(IoError::Json(_))));
    }
}
