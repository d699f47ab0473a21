//! Process-wide engine runtime
//!
//! The engine library is loaded once per process. Players refuse to open
//! until [`initialize`] has succeeded.

use crate::error::{BridgeError, Result};
use once_cell::sync::OnceCell;
use std::fmt;
use std::time::Instant;
use tracing::info;

/// Facts recorded when the runtime was initialized
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    /// Library name passed to [`initialize`]
    pub library: String,
    /// Engine version reported by the loader
    pub version: Option<String>,
    pub initialized_at: Instant,
}

static RUNTIME: OnceCell<RuntimeInfo> = OnceCell::new();

/// Load the engine library once.
///
/// The loader runs on the first successful call only; it returns the engine
/// version if it knows one. Later calls return the recorded info. A failing
/// loader leaves the runtime uninitialized so a later call may retry.
pub fn initialize<F, E>(library: &str, loader: F) -> Result<&'static RuntimeInfo>
where
    F: FnOnce(&str) -> std::result::Result<Option<String>, E>,
    E: fmt::Display,
{
    RUNTIME.get_or_try_init(|| {
        let version = loader(library).map_err(|e| BridgeError::LoadFailed {
            library: library.to_string(),
            reason: e.to_string(),
        })?;
        info!(
            "BlueTune runtime initialized: library={} version={}",
            library,
            version.as_deref().unwrap_or("unknown")
        );
        Ok(RuntimeInfo {
            library: library.to_string(),
            version,
            initialized_at: Instant::now(),
        })
    })
}

pub fn is_initialized() -> bool {
    RUNTIME.get().is_some()
}

pub fn info() -> Option<&'static RuntimeInfo> {
    RUNTIME.get()
}

pub(crate) fn ensure_initialized() -> Result<()> {
    if is_initialized() {
        Ok(())
    } else {
        Err(BridgeError::NotInitialized)
    }
}
