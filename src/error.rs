//! Error types for the window manager.
//!
//! Device read failures and application load failures are recoverable and
//! never stop the run loop. Initialization failures either degrade (renderer,
//! application tree) or abort startup (input devices, configuration).

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Which input stream a read failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Keyboard,
    Pointer,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Keyboard => f.write_str("keyboard"),
            Device::Pointer => f.write_str("pointer"),
        }
    }
}

/// Transient failure reading one input stream. Swallowed by the run loop.
#[derive(Debug, Error)]
#[error("failed to read {device} events: {source}")]
pub struct DeviceReadError {
    pub device: Device,
    #[source]
    pub source: io::Error,
}

impl DeviceReadError {
    pub fn new(device: Device, source: io::Error) -> Self {
        Self { device, source }
    }
}

/// Failure reported by an application's own `load` entry point.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct AppError {
    message: String,
}

impl AppError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors from resolving and loading an application.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Path does not name an application in the discovered tree.
    #[error("no application at '{path}'")]
    NotFound { path: String },

    /// Identifier has no bound entry point in the catalog.
    #[error("application '{identifier}' has no bound entry point")]
    Unbound { identifier: String },

    /// The application's `load` failed.
    #[error("application '{identifier}' failed to load: {source}")]
    Failed {
        identifier: String,
        #[source]
        source: AppError,
    },
}

/// Errors loading or validating the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid {name} hotkey '{value}'")]
    InvalidHotkey { name: &'static str, value: String },
}

/// Errors acquiring process-wide resources at startup.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to open terminal display: {0}")]
    Terminal(#[source] io::Error),

    #[error("failed to open input devices: {0}")]
    InputDevice(#[source] io::Error),

    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to install logger: {0}")]
    Logging(String),
}

/// Failure presenting a frame.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("present failed: {0}")]
    Io(#[from] io::Error),
}

/// Top-level error returned by [`crate::run`].
#[derive(Debug, Error)]
pub enum WmError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Init(#[from] InitError),
}
