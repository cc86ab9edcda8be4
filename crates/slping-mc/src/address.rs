//! Server address parsing.

use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

use crate::error::{ProtocolError, Result};

/// Port assumed when an address does not name one.
pub const DEFAULT_PORT: u16 = 25565;

/// Longest host name the handshake carries.
pub const MAX_HOST_LEN: usize = 255;

/// A validated `host:port` pair.
///
/// Construction is the only place a caller's address can be rejected, so a
/// bad address never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerAddress {
    host: String,
    port: u16,
}

impl ServerAddress {
    /// Create an address from a host name or IP literal and a port.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Configuration`] if the host is empty, longer
    /// than [`MAX_HOST_LEN`] bytes, contains whitespace, or the port is zero.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into();

        if host.is_empty() {
            return Err(config_error("host is empty"));
        }
        if host.len() > MAX_HOST_LEN {
            return Err(config_error(format!(
                "host is {} bytes (max {MAX_HOST_LEN})",
                host.len()
            )));
        }
        if host.chars().any(char::is_whitespace) {
            return Err(config_error(format!("host '{host}' contains whitespace")));
        }
        if port == 0 {
            return Err(config_error("port must be non-zero"));
        }

        Ok(Self { host, port })
    }

    /// The host name or IP literal, without brackets.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Replace the port.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Configuration`] if the port is zero.
    pub fn with_port(self, port: u16) -> Result<Self> {
        Self::new(self.host, port)
    }
}

impl FromStr for ServerAddress {
    type Err = ProtocolError;

    /// Parse `host`, `host:port`, `[v6]`, `[v6]:port` or a bare IPv6 literal.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        let (host, port) = if let Some(rest) = s.strip_prefix('[') {
            let (host, after) = rest
                .split_once(']')
                .ok_or_else(|| config_error(format!("missing ']' in '{s}'")))?;
            match after {
                "" => (host, None),
                _ => {
                    let port = after.strip_prefix(':').ok_or_else(|| {
                        config_error(format!("unexpected '{after}' after ']' in '{s}'"))
                    })?;
                    (host, Some(port))
                }
            }
        } else if s.parse::<Ipv6Addr>().is_ok() {
            (s, None)
        } else {
            match s.rsplit_once(':') {
                Some((host, _)) if host.contains(':') => {
                    return Err(config_error(format!(
                        "too many colons in '{s}' (bracket IPv6 addresses)"
                    )));
                }
                Some((host, port)) => (host, Some(port)),
                None => (s, None),
            }
        };

        let port = match port {
            Some(port) => port
                .parse::<u16>()
                .map_err(|e| config_error(format!("invalid port '{port}': {e}")))?,
            None => DEFAULT_PORT,
        };

        Self::new(host, port)
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

fn config_error(message: impl Into<String>) -> ProtocolError {
    ProtocolError::Configuration(message.into())
}
