//! Transport helpers: connecting, listening, and the boxed stream type both
//! binaries share so TCP and Unix codepaths stay identical above this layer.

use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream, UnixListener, UnixStream};
use tokio::time::timeout;

use crate::address::{AddressFamily, ConnectionInfo};
use crate::error::{Error, Result};

/// Dial timeout for TCP connections. Unix sockets connect without one but
/// fail fast when the socket file is missing.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// A duplex byte stream over either transport.
pub trait Connection: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Connection for T {}

pub type BoxedConnection = Box<dyn Connection>;

/// Connect to a classified endpoint.
pub async fn connect(info: &ConnectionInfo) -> Result<BoxedConnection> {
    match info.family {
        AddressFamily::Tcp => {
            let stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(&info.endpoint))
                .await
                .map_err(|_| Error::ConnectTimeout(CONNECT_TIMEOUT))??;
            Ok(Box::new(stream))
        }
        AddressFamily::Unix => {
            if !Path::new(&info.endpoint).exists() {
                return Err(Error::SocketNotFound(info.endpoint.clone()));
            }
            let stream = UnixStream::connect(&info.endpoint).await?;
            Ok(Box::new(stream))
        }
    }
}

/// A listener over either transport.
pub enum Listener {
    Tcp(TcpListener),
    Unix(UnixListener),
}

impl Listener {
    /// Bind to a classified endpoint. For Unix sockets a stale socket file is
    /// removed first (a missing file is not an error).
    pub async fn bind(info: &ConnectionInfo) -> Result<Self> {
        match info.family {
            AddressFamily::Tcp => Ok(Self::Tcp(TcpListener::bind(&info.endpoint).await?)),
            AddressFamily::Unix => {
                match std::fs::remove_file(&info.endpoint) {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(Error::Io(e)),
                }
                Ok(Self::Unix(UnixListener::bind(&info.endpoint)?))
            }
        }
    }

    /// Accept one connection, returning it with a peer label for logging and
    /// process identifiers.
    pub async fn accept(&self) -> Result<(BoxedConnection, String)> {
        match self {
            Self::Tcp(listener) => {
                let (stream, addr) = listener.accept().await?;
                Ok((Box::new(stream), addr.to_string()))
            }
            Self::Unix(listener) => {
                let (stream, _) = listener.accept().await?;
                Ok((Box::new(stream), "unix".to_string()))
            }
        }
    }
}
