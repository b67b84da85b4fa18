//! Logging configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Logging configuration consumed by the host's subscriber setup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Default log level directive (`RUST_LOG` takes precedence)
    pub level: String,
    /// Write formatted logs to stderr
    pub console_output: bool,
    /// Write formatted logs to a file under `log_dir`
    pub file_output: bool,
    /// Directory the log file is created in
    pub log_dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl LogConfig {
    /// Parse the configured level, falling back to INFO.
    pub fn parse_level(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::INFO)
    }

    /// Path of the current log file.
    pub fn current_log_path(&self) -> PathBuf {
        self.log_dir.join("soundlight.log")
    }

    /// Create the log directory if missing.
    pub fn ensure_log_directory(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.log_dir)
    }
}
