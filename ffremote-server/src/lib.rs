//! # ffremote Server
//!
//! Accepts client connections, authenticates the command handshake, spawns
//! the configured transcoder binary, and proxies stdin, stdout, and stderr
//! between the client and the subprocess until either side ends the session.

mod proxy;
pub mod registry;
pub mod server;
pub mod session;

pub use registry::{ProcessRecord, ProcessRegistry};
pub use server::serve;
