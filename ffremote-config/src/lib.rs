//! # ffremote Config
//!
//! Configuration for the ffremote client and server: JSONC config files
//! discovered along a fixed search path, log destination parsing and tracing
//! setup, and the path-rewrite rules the server applies to incoming argument
//! vectors.

pub mod error;
pub mod jsonc;
pub mod log;
pub mod paths;
pub mod rewrite;
pub mod settings;

pub use error::{ConfigError, Result};
pub use jsonc::strip_comments;
pub use log::{init_logging, LogDestination};
pub use paths::{search_paths, ConfigKind};
pub use rewrite::rewrite_args;
pub use settings::{load_client_config, load_server_config, ClientConfig, LogValue, ServerConfig};
