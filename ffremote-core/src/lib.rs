//! # ffremote Core
//!
//! Shared protocol layer for the ffremote client and server.
//!
//! This crate provides the building blocks both binaries speak through:
//! - Framed message types and the wire codec
//! - HMAC-based command authentication
//! - The command payload layout (version, signature, argument vector)
//! - Address classification (TCP vs. Unix socket) and transport helpers

pub mod address;
pub mod auth;
pub mod codec;
pub mod command;
pub mod error;
pub mod message;
pub mod net;

pub use address::{AddressFamily, ConnectionInfo};
pub use codec::{read_frame, write_frame, FrameSink};
pub use command::CommandRequest;
pub use error::{Error, Result};
pub use message::{Frame, MessageType, MAX_PAYLOAD_SIZE, PROTOCOL_VERSION, SIGNATURE_LENGTH};
pub use net::{BoxedConnection, Listener};
