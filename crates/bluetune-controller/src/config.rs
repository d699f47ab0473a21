//! Controller configuration file

use anyhow::{Context, Result};
use bluetune_core::LogConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings read from `controller.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub log: LogConfig,
    /// Output opened at startup
    pub output: Option<String>,
    /// Volume percentage applied at startup
    pub initial_volume: Option<i32>,
    /// Deliver notifications through a queue drained by the main thread
    pub use_dispatch_queue: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            output: None,
            initial_volume: None,
            use_dispatch_queue: false,
        }
    }
}

impl ControllerConfig {
    /// Default location: `<config dir>/bluetune/controller.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bluetune").join("controller.toml"))
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing file yields the defaults; a file that exists but does not
    /// parse is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&text).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
