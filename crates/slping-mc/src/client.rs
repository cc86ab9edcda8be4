//! Server List Ping exchange.
//!
//! One ping is one connection: dial, send the handshake, send the status
//! request, read the status response. The connection is dropped when the
//! exchange ends, whether it succeeded or not.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{Instrument, debug, info_span};

use crate::address::ServerAddress;
use crate::codec::write_packet;
use crate::error::{ProtocolError, Result};
use crate::packets::{Handshake, Packet, StatusRequest, StatusResponse};
use crate::version::DEFAULT_PROTOCOL_VERSION;

/// How long to wait for the TCP dial.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// How long to wait for the status response once the request is sent.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Progress of a single exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    /// No connection yet.
    Disconnected,
    /// TCP connection established.
    Connected,
    /// Handshake written, status state entered.
    HandshakeSent,
    /// Status request written, awaiting the response.
    StatusRequested,
    /// Terminal success.
    ResponseReceived,
    /// Terminal failure.
    Failed,
}

/// Tracks and logs the state of one exchange.
#[derive(Debug)]
struct Exchange {
    state: ExchangeState,
}

impl Exchange {
    const fn new(state: ExchangeState) -> Self {
        Self { state }
    }

    fn advance(&mut self, next: ExchangeState) {
        debug!(from = ?self.state, to = ?next, "Exchange state changed");
        self.state = next;
    }

    fn finish<T>(&mut self, result: &Result<T>) {
        if let Err(e) = result {
            debug!(from = ?self.state, "Exchange failed: {e}");
            self.state = ExchangeState::Failed;
        }
    }
}

/// Server List Ping client.
///
/// Holds configuration only; every [`StatusClient::ping`] opens and owns its
/// own connection, so one client can serve any number of concurrent pings.
#[derive(Debug, Clone)]
pub struct StatusClient {
    /// Bound on the TCP dial.
    connect_timeout: Duration,
    /// Bound on reading the status response.
    read_timeout: Duration,
    /// Protocol version announced in the handshake.
    protocol_version: i32,
}

impl StatusClient {
    /// Create a client with the default timeouts and protocol version.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            protocol_version: DEFAULT_PROTOCOL_VERSION,
        }
    }

    /// Set the TCP dial timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Set the status response read timeout.
    #[must_use]
    pub const fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Set the protocol version announced in the handshake.
    #[must_use]
    pub const fn with_protocol_version(mut self, protocol_version: i32) -> Self {
        self.protocol_version = protocol_version;
        self
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    #[must_use]
    pub const fn protocol_version(&self) -> i32 {
        self.protocol_version
    }

    /// Ping `address` and return its status.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Connection`] if the dial fails or times out,
    /// [`ProtocolError::Timeout`] if the server does not answer in time, and
    /// any framing or decoding error from the response.
    pub async fn ping(&self, address: &ServerAddress) -> Result<StatusResponse> {
        async {
            let mut exchange = Exchange::new(ExchangeState::Disconnected);

            let result = async {
                let mut stream = self.connect(address).await?;
                exchange.advance(ExchangeState::Connected);
                self.run(&mut stream, address, &mut exchange).await
            }
            .await;

            exchange.finish(&result);
            result
        }
        .instrument(info_span!(
            "ping",
            host = address.host(),
            port = address.port()
        ))
        .await
    }

    /// Run the handshake and status exchange over an already connected
    /// stream.
    ///
    /// `address` is only used for the handshake contents.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails, the response read times out, or
    /// the response cannot be decoded.
    pub async fn exchange<S: AsyncRead + AsyncWrite + Unpin>(
        &self,
        stream: &mut S,
        address: &ServerAddress,
    ) -> Result<StatusResponse> {
        let mut exchange = Exchange::new(ExchangeState::Connected);
        let result = self.run(stream, address, &mut exchange).await;
        exchange.finish(&result);
        result
    }

    async fn connect(&self, address: &ServerAddress) -> Result<TcpStream> {
        let dial = TcpStream::connect((address.host(), address.port()));

        match timeout(self.connect_timeout, dial).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(source)) => Err(ProtocolError::Connection {
                addr: address.to_string(),
                source,
            }),
            Err(_) => Err(ProtocolError::Connection {
                addr: address.to_string(),
                source: io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("timed out after {:?}", self.connect_timeout),
                ),
            }),
        }
    }

    async fn run<S: AsyncRead + AsyncWrite + Unpin>(
        &self,
        stream: &mut S,
        address: &ServerAddress,
        exchange: &mut Exchange,
    ) -> Result<StatusResponse> {
        let handshake = Handshake::status(self.protocol_version, address);
        write_packet(stream, &handshake.to_raw()).await?;
        debug!(state = ?Handshake::STATE, id = Handshake::ID, "Sent handshake");
        exchange.advance(ExchangeState::HandshakeSent);

        write_packet(stream, &StatusRequest.to_raw()).await?;
        debug!(state = ?StatusRequest::STATE, id = StatusRequest::ID, "Sent status request");
        exchange.advance(ExchangeState::StatusRequested);

        let status = timeout(self.read_timeout, StatusResponse::read_from(stream))
            .await
            .map_err(|_| ProtocolError::Timeout(self.read_timeout))??;
        exchange.advance(ExchangeState::ResponseReceived);

        debug!(
            version = %status.version.name,
            protocol = status.version.protocol,
            online = status.players.online,
            max = status.players.max,
            "Received status"
        );

        Ok(status)
    }
}

impl Default for StatusClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Ping `host:port` with the default client configuration.
///
/// # Errors
///
/// Returns [`ProtocolError::Configuration`] before any I/O if the host or
/// port is unusable, otherwise any error from [`StatusClient::ping`].
pub async fn ping(host: &str, port: u16) -> Result<StatusResponse> {
    let address = ServerAddress::new(host, port)?;
    StatusClient::new().ping(&address).await
}
