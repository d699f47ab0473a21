//! Subscriber setup for the controller binary
//!
//! stdout belongs to the console listener, so log lines go to stderr and,
//! when enabled, to a rotating set of files under the configured directory.

use anyhow::{Context, Result};
use bluetune_core::LogConfig;
use std::fs::File;
use std::path::PathBuf;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Keeps the file writer thread alive; dropping it flushes pending lines
pub struct LogGuard {
    _worker: WorkerGuard,
    pub path: PathBuf,
}

/// `RUST_LOG` wins over the configured level
fn level_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(config.parse_level().into())
        .from_env_lossy()
}

/// Prepare the log directory and open a fresh file writer
fn open_log_file(config: &LogConfig) -> Result<(NonBlocking, LogGuard)> {
    config
        .ensure_log_directory()
        .with_context(|| format!("Failed to create log directory {:?}", config.log_dir))?;
    match config.cleanup_old_logs() {
        Ok(0) => {}
        Ok(removed) => eprintln!("Removed {} old log file(s)", removed),
        Err(e) => eprintln!("Warning: could not prune old logs: {}", e),
    }

    let path = config.current_log_path();
    let file =
        File::create(&path).with_context(|| format!("Failed to create log file {:?}", path))?;
    let (writer, worker) = tracing_appender::non_blocking(file);
    Ok((
        writer,
        LogGuard {
            _worker: worker,
            path,
        },
    ))
}

/// Install the global subscriber. Returns a guard when logging to a file.
pub fn init(config: &LogConfig) -> Result<Option<LogGuard>> {
    let stderr_layer = config.console_output.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(level_filter(config))
    });

    let (file_layer, guard) = if config.file_output {
        let (writer, guard) = open_log_file(config)?;
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_thread_names(true)
            .with_filter(level_filter(config));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    match &guard {
        Some(guard) => tracing::info!("Logging at {} to {:?}", config.level, guard.path),
        None => tracing::info!("Logging at {}", config.level),
    }
    Ok(guard)
}
