//! Endpoint address classification.

use std::path::Path;

use crate::error::{Error, Result};

/// The transport family an endpoint string resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    /// `host:port`, a reliable ordered stream socket.
    Tcp,
    /// An absolute filesystem path, a Unix domain socket on the same host.
    Unix,
}

impl AddressFamily {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Unix => "unix",
        }
    }
}

/// A classified endpoint. Immutable after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub family: AddressFamily,
    pub endpoint: String,
}

/// Classify an address string.
///
/// A string containing `:` is a TCP endpoint; otherwise an absolute path is a
/// Unix socket. The classification is intentionally syntactic; DNS resolution
/// and file existence are checked at connect or listen time.
pub fn parse_address(address: &str) -> Result<ConnectionInfo> {
    if address.contains(':') {
        return Ok(ConnectionInfo {
            family: AddressFamily::Tcp,
            endpoint: address.to_string(),
        });
    }

    if Path::new(address).is_absolute() {
        return Ok(ConnectionInfo {
            family: AddressFamily::Unix,
            endpoint: address.to_string(),
        });
    }

    Err(Error::InvalidAddress(address.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_port_is_tcp() {
        let info = parse_address("127.0.0.1:5050").unwrap();
        assert_eq!(info.family, AddressFamily::Tcp);
        assert_eq!(info.endpoint, "127.0.0.1:5050");

        let info = parse_address("transcode.internal:9000").unwrap();
        assert_eq!(info.family, AddressFamily::Tcp);
    }

    #[test]
    fn test_absolute_path_is_unix() {
        let info = parse_address("/tmp/ffremote.sock").unwrap();
        assert_eq!(info.family, AddressFamily::Unix);
        assert_eq!(info.endpoint, "/tmp/ffremote.sock");
    }

    #[test]
    fn test_relative_path_is_invalid() {
        assert!(matches!(
            parse_address("ffremote.sock"),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(parse_address(""), Err(Error::InvalidAddress(_))));
    }

    #[test]
    fn test_colon_wins_over_path() {
        // The rules apply in order, so a colon classifies as TCP even if the
        // string also looks path-like.
        let info = parse_address("/weird:path").unwrap();
        assert_eq!(info.family, AddressFamily::Tcp);
    }
}
