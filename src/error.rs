//! Error types for the fallible edges of the crate.
//!
//! The dispatch path itself never fails; these cover configuration,
//! device/terminal setup, and the external collaborators.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors raised while setting up input sources.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("gamepad backend unavailable: {0}")]
    Gamepad(String),

    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Failures reported by external collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("game {0} not found")]
    GameNotFound(String),

    #[error("unknown audio sink: {0}")]
    UnknownSink(String),

    #[error("bluetooth device {0} not found")]
    DeviceNotFound(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, InputError>;
