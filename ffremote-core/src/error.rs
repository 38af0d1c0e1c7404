//! Error types for the ffremote protocol layer.

use std::time::Duration;

use thiserror::Error;

/// Main error type for protocol and transport operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The peer closed the connection before a frame header was read.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// A frame announced a payload larger than the protocol allows.
    #[error("payload length too large: {length} bytes (limit {max})")]
    OversizedPayload { length: usize, max: usize },

    /// The stream ended in the middle of a frame.
    #[error("short read while reading {0}")]
    ShortRead(&'static str),

    /// A command payload failed to parse.
    #[error("invalid command message: {0}")]
    MalformedCommand(String),

    /// The address string is neither host:port nor an absolute path.
    #[error("invalid address format: {0} (must be host:port or /path/to/socket)")]
    InvalidAddress(String),

    /// The Unix socket path does not exist on the filesystem.
    #[error("unix socket {0} does not exist")]
    SocketNotFound(String),

    /// The connection attempt did not complete in time.
    #[error("connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for protocol operations.
pub type Result<T> = std::result::Result<T, Error>;
