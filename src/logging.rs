//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! The terminal is the display, so log lines go to a file instead of stderr.
//! `RUST_LOG` overrides the configured level filter.
//!
//! # Log Levels
//!
//! - `warn`: recoverable failures (application load, device reads, fallbacks)
//! - `info`: lifecycle (startup, discovery, devices opened/closed)
//! - `debug`: state changes (windows, menu, paint)
//! - `trace`: every routed input event

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::InitError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive, e.g. "info" or "snakewm_lib=debug"
    pub level: String,
    /// Append log lines here; `null` discards them
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some(PathBuf::from("snakewm.log")),
        }
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), InitError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| InitError::Logging(e.to_string()))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true);

    let installed = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| InitError::LogFile {
                    path: path.clone(),
                    source,
                })?;
            builder.with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(io::sink).try_init(),
    };

    installed.map_err(|e| InitError::Logging(e.to_string()))
}
