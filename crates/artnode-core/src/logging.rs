//! Logging configuration
//!
//! Only the settings live here; the subscriber is installed by the binary.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default level (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
    /// Write to stderr
    pub console_output: bool,
    /// Write to a timestamped file under `log_path`
    pub file_output: bool,
    /// Directory holding log files
    pub log_path: PathBuf,
    /// Number of log files kept by [`LogConfig::cleanup_old_logs`]
    pub max_log_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            log_path: PathBuf::from("logs"),
            max_log_files: 10,
        }
    }
}

impl LogConfig {
    /// Configured level, falling back to INFO when unparsable
    pub fn parse_level(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::INFO)
    }

    /// Create the log directory if needed
    pub fn ensure_log_directory(&self) -> std::io::Result<()> {
        if self.file_output {
            std::fs::create_dir_all(&self.log_path)?;
        }
        Ok(())
    }

    /// Path of the log file for this session
    pub fn current_log_path(&self) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        self.log_path.join(format!("artnode_{stamp}.log"))
    }

    /// Delete the oldest `artnode_*.log` files beyond `max_log_files`
    pub fn cleanup_old_logs(&self) -> std::io::Result<usize> {
        if !self.log_path.is_dir() {
            return Ok(0);
        }

        let mut logs: Vec<PathBuf> = std::fs::read_dir(&self.log_path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with("artnode_") && n.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();

        if logs.len() <= self.max_log_files {
            return Ok(0);
        }

        // Timestamped names sort chronologically
        logs.sort();
        let excess = logs.len() - self.max_log_files;
        for path in &logs[..excess] {
            std::fs::remove_file(path)?;
        }
        Ok(excess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        let mut config = LogConfig::default();
        assert_eq!(config.parse_level(), LevelFilter::INFO);

        config.level = "debug".to_string();
        assert_eq!(config.parse_level(), LevelFilter::DEBUG);

        config.level = "loud".to_string();
        assert_eq!(config.parse_level(), LevelFilter::INFO);
    }

    #[test]
    fn test_cleanup_old_logs() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            let name = format!("artnode_2024010{i}_000000.log");
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::write(dir.path().join("other.txt"), b"x").unwrap();

        let config = LogConfig {
            log_path: dir.path().to_path_buf(),
            max_log_files: 2,
            ..Default::default()
        };
        assert_eq!(config.cleanup_old_logs().unwrap(), 3);
        assert!(dir.path().join("artnode_20240104_000000.log").exists());
        assert!(!dir.path().join("artnode_20240100_000000.log").exists());
        assert!(dir.path().join("other.txt").exists());
    }
}
