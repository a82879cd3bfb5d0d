//! Log sinks for the daemon
//!
//! Builds the [`LogContext`] the engine logs through from the `[logging]`
//! section: an optional plain-text file sink, an optional stderr sink, and a
//! level filter. Nothing here installs a process-wide subscriber.

use anyhow::{Context, Result};
use ddns_core::LogContext;
use ddns_core::config::LoggingConfig;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Map a configured level name to a filter (unknown names fall back to INFO)
pub fn level_filter(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" | "warning" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    }
}

/// Log file used when `logging.path` is not set
pub fn log_file_path(config: &LoggingConfig, default_path: &Path) -> PathBuf {
    config
        .path
        .clone()
        .unwrap_or_else(|| default_path.to_path_buf())
}

/// Build the log context described by `config`
///
/// # Errors
///
/// Fails if the log file (or its directory) cannot be created.
pub fn build_log_context(config: &LoggingConfig, default_path: &Path) -> Result<LogContext> {
    if !config.enabled || (!config.file && !config.console) {
        return Ok(LogContext::disabled());
    }

    let file_layer = if config.file {
        let path = log_file_path(config, default_path);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create log directory {}", parent.display())
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        Some(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
    } else {
        None
    };

    let console_layer = config
        .console
        .then(|| fmt::layer().with_writer(std::io::stderr));

    let subscriber = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .with(level_filter(&config.level));

    Ok(LogContext::new(subscriber))
}
