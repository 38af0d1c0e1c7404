//! Log destination parsing and tracing setup.
//!
//! The `log` config field selects where the process logs: `false`/`null`
//! disables logging entirely, `"stdout"`/`"stderr"` pick a standard stream,
//! and any other string is a file path (with a small allowlist of environment
//! variables expanded).

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::error::{ConfigError, Result};
use crate::settings::LogValue;

/// Environment variables allowed in log path expansion.
const ALLOWED_ENV_VARS: &[&str] = &[
    "HOME",
    "TMPDIR",
    "TMP",
    "TEMP",
    "USER",
    "LOGDIR",
    "PWD",
    "XDG_DATA_HOME",
    "XDG_CONFIG_HOME",
    "XDG_STATE_HOME",
];

/// A resolved log destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    Disabled,
    Stdout,
    Stderr,
    File(PathBuf),
}

impl LogDestination {
    /// Resolve the raw config value. `true` is not a valid destination.
    pub fn resolve(value: Option<&LogValue>) -> Result<Self> {
        match value {
            None | Some(LogValue::Flag(false)) => Ok(Self::Disabled),
            Some(LogValue::Flag(true)) => Err(ConfigError::InvalidLog(
                "true is not a destination (use \"stdout\", \"stderr\" or a file path)".into(),
            )),
            Some(LogValue::Destination(s)) => match s.as_str() {
                "stdout" => Ok(Self::Stdout),
                "stderr" => Ok(Self::Stderr),
                path => Ok(Self::File(PathBuf::from(expand_env(path)))),
            },
        }
    }
}

/// Expand `$VAR` and `${VAR}` for the allowlisted variables only. Unset
/// variables expand to the empty string.
fn expand_env(path: &str) -> String {
    if !path.contains('$') {
        return path.to_string();
    }

    let mut result = path.to_string();
    for var in ALLOWED_ENV_VARS {
        let plain = format!("${var}");
        let braced = format!("${{{var}}}");
        if result.contains(&plain) || result.contains(&braced) {
            let value = std::env::var(var).unwrap_or_default();
            result = result.replace(&braced, &value);
            result = result.replace(&plain, &value);
        }
    }
    result
}

/// Install the global tracing subscriber for the resolved destination.
///
/// `debug` lowers the default level filter to `debug`; `RUST_LOG` overrides
/// it either way. A disabled destination installs nothing.
pub fn init_logging(destination: &LogDestination, debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    match destination {
        LogDestination::Disabled => {}
        LogDestination::Stdout => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stdout)
                .finish();
            let _ = tracing::subscriber::set_global_default(subscriber);
        }
        LogDestination::Stderr => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .finish();
            let _ = tracing::subscriber::set_global_default(subscriber);
        }
        LogDestination::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .finish();
            let _ = tracing::subscriber::set_global_default(subscriber);
        }
    }

    Ok(())
}
