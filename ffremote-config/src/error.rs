//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration loading and parsing errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No config file was found anywhere on the search path.
    #[error("no valid configuration found (searched {0} paths)")]
    NotFound(usize),

    /// A config file exists but could not be read.
    #[error("error loading config from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A config file was read but is not valid JSON after comment stripping.
    #[error("error parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The `log` field holds a value the config schema does not allow.
    #[error("invalid log configuration: {0}")]
    InvalidLog(String),

    /// I/O errors from log file setup.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
