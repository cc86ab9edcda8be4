//! Protocol error types.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while pinging a server.
///
/// Every variant is terminal for the exchange that produced it: nothing is
/// retried and no partial status is returned.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The TCP dial failed or did not complete within the connect timeout.
    #[error("failed to connect to {addr}: {source}")]
    Connection {
        /// The `host:port` that was dialed.
        addr: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The server did not answer within the read timeout.
    #[error("server did not respond within {0:?}")]
    Timeout(Duration),

    /// An I/O error occurred on an established connection.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream closed before a complete packet was read.
    #[error("stream closed early: expected {expected} bytes, got {read}")]
    ShortRead {
        /// Bytes the length header promised.
        expected: usize,
        /// Bytes actually available.
        read: usize,
    },

    /// A varint ran off the end of its buffer or past 10 bytes.
    #[error("truncated or overlong varint")]
    TruncatedVarint,

    /// A packet length header was outside the accepted range.
    #[error("invalid packet length: {len} bytes (max {max})")]
    InvalidLength {
        /// The declared length.
        len: u64,
        /// The maximum allowed length.
        max: usize,
    },

    /// A header varint of the status response could not be decoded.
    #[error("malformed status response header: could not read {0}")]
    MalformedHeader(&'static str),

    /// The status response body was not the expected JSON document.
    #[error("malformed status response body: {0}")]
    MalformedBody(#[source] serde_json::Error),

    /// A string exceeded the maximum length.
    #[error("string too long: {len} bytes (max {max})")]
    StringTooLong {
        /// The actual length of the string.
        len: u64,
        /// The maximum allowed length.
        max: usize,
    },

    /// An unexpected packet ID was received.
    #[error("invalid packet ID: {0:#04x}")]
    InvalidPacketId(u64),

    /// An invalid next state was received in a handshake.
    #[error("invalid next state: {0}")]
    InvalidNextState(u64),

    /// The caller supplied an unusable server address.
    #[error("invalid server address: {0}")]
    Configuration(String),
}

/// Result type alias using [`ProtocolError`].
pub type Result<T> = std::result::Result<T, ProtocolError>;
