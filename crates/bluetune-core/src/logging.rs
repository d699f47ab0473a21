//! Logging configuration
//!
//! Installing the subscriber is left to binaries; this module only describes
//! where logs go and manages the log directory.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

const LOG_FILE_PREFIX: &str = "bluetune";

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level name: trace, debug, info, warn, error or off
    pub level: String,
    pub console_output: bool,
    pub file_output: bool,
    pub log_dir: PathBuf,
    /// Number of log files kept by [`LogConfig::cleanup_old_logs`]
    pub max_log_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            log_dir: default_log_dir(),
            max_log_files: 10,
        }
    }
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("bluetune")
        .join("logs")
}

impl LogConfig {
    /// Parse the configured level, falling back to INFO
    pub fn parse_level(&self) -> LevelFilter {
        self.level.trim().parse().unwrap_or(LevelFilter::INFO)
    }

    pub fn ensure_log_directory(&self) -> io::Result<()> {
        fs::create_dir_all(&self.log_dir)
    }

    /// Path of the log file for a session started now
    pub fn current_log_path(&self) -> PathBuf {
        let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        self.log_dir.join(format!("{}_{}.log", LOG_FILE_PREFIX, stamp))
    }

    /// Delete the oldest log files so that at most `max_log_files` remain.
    ///
    /// Returns the number of files removed.
    pub fn cleanup_old_logs(&self) -> io::Result<usize> {
        if !self.log_dir.exists() {
            return Ok(0);
        }

        let mut logs: Vec<PathBuf> = fs::read_dir(&self.log_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path.extension().is_some_and(|ext| ext == "log")
                    && path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX))
            })
            .collect();

        if logs.len() <= self.max_log_files {
            return Ok(0);
        }

        // timestamped names sort chronologically
        logs.sort();
        let excess = logs.len() - self.max_log_files;
        for path in &logs[..excess] {
            fs::remove_file(path)?;
            tracing::debug!("Removed old log file {:?}", path);
        }
        Ok(excess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir, max_log_files: usize) -> LogConfig {
        LogConfig {
            log_dir: dir.path().join("logs"),
            max_log_files,
            ..Default::default()
        }
    }

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
    fn test_cleanup_keeps_newest_logs() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, 2);
        config.ensure_log_directory().unwrap();

        for day in 1..=4 {
            let name = format!("bluetune_2024-01-0{}_10-00-00.log", day);
            fs::write(config.log_dir.join(name), "x").unwrap();
        }
        fs::write(config.log_dir.join("notes.txt"), "keep").unwrap();

        assert_eq!(config.cleanup_old_logs().unwrap(), 2);
        assert!(!config.log_dir.join("bluetune_2024-01-01_10-00-00.log").exists());
        assert!(config.log_dir.join("bluetune_2024-01-04_10-00-00.log").exists());
        assert!(config.log_dir.join("notes.txt").exists());
    }

    #[test]
    fn test_cleanup_without_directory() {
        let dir = TempDir::new().unwrap();
        assert_eq!(config_in(&dir, 1).cleanup_old_logs().unwrap(), 0);
    }

    #[test]
    fn test_current_log_path_in_log_dir() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, 1);
        let path = config.current_log_path();
        assert!(path.starts_with(&config.log_dir));
        assert_eq!(path.extension().unwrap(), "log");
    }
}
