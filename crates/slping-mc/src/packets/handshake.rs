//! Handshake packet definitions.
//!
//! The handshake is the first packet sent by the client and determines
//! whether this is a status ping or a login attempt.

use std::io;

use bytes::{Buf, BufMut, BytesMut};

use crate::address::{MAX_HOST_LEN, ServerAddress};
use crate::codec::{RawPacket, read_string, read_varint_from_buf, write_string};
use crate::error::{ProtocolError, Result};
use crate::packets::traits::{ConnectionState, Packet};
use crate::varint::write_varint;

/// The next state after handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextState {
    /// Status request (server list ping).
    Status = 1,
    /// Login request.
    Login = 2,
}

impl TryFrom<u64> for NextState {
    type Error = ProtocolError;

    fn try_from(value: u64) -> Result<Self> {
        match value {
            1 => Ok(Self::Status),
            2 => Ok(Self::Login),
            _ => Err(ProtocolError::InvalidNextState(value)),
        }
    }
}

/// Handshake packet sent by the client.
///
/// This is always the first packet in a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    /// The protocol version the client is using.
    pub protocol_version: i32,
    /// The server address the client connected to.
    pub server_address: String,
    /// The server port the client connected to.
    pub server_port: u16,
    /// The next state: Status (1) or Login (2).
    pub next_state: NextState,
}

impl Packet for Handshake {
    const ID: u64 = 0x00;
    const STATE: ConnectionState = ConnectionState::Handshaking;
}

impl Handshake {
    /// Build the handshake that opens a status exchange with `address`.
    #[must_use]
    pub fn status(protocol_version: i32, address: &ServerAddress) -> Self {
        Self {
            protocol_version,
            server_address: address.host().to_string(),
            server_port: address.port(),
            next_state: NextState::Status,
        }
    }

    /// Parse a handshake from a raw packet.
    ///
    /// # Errors
    ///
    /// Returns an error if the packet is malformed.
    pub fn from_raw(packet: &RawPacket) -> Result<Self> {
        if packet.id != Self::ID {
            return Err(ProtocolError::InvalidPacketId(packet.id));
        }

        let mut buf = packet.payload.clone().freeze();

        let protocol_version = read_varint_from_buf(&mut buf)?;
        // Negative versions travel as their 32-bit two's complement.
        #[allow(clippy::cast_possible_wrap)]
        let protocol_version = u32::try_from(protocol_version)
            .map(|version| version as i32)
            .map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidData, "protocol version out of range")
            })?;

        let server_address = read_string(&mut buf, MAX_HOST_LEN)?;

        if buf.remaining() < 2 {
            return Err(ProtocolError::ShortRead {
                expected: 2,
                read: buf.remaining(),
            });
        }
        let server_port = buf.get_u16();

        let next_state = NextState::try_from(read_varint_from_buf(&mut buf)?)?;

        Ok(Self {
            protocol_version,
            server_address,
            server_port,
            next_state,
        })
    }

    /// Encode the handshake to a raw packet.
    ///
    /// The port is written as two big-endian bytes, which is the same wire
    /// form whether the peer reads it as signed or unsigned.
    #[must_use]
    pub fn to_raw(&self) -> RawPacket {
        let mut payload = BytesMut::new();

        #[allow(clippy::cast_sign_loss)]
        let protocol_version = self.protocol_version as u32;
        write_varint(&mut payload, u64::from(protocol_version));
        write_string(&mut payload, &self.server_address);
        payload.put_u16(self.server_port);
        write_varint(&mut payload, self.next_state as u64);

        RawPacket::new(Self::ID, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::frame;
    use crate::version::DEFAULT_PROTOCOL_VERSION;

    fn localhost() -> ServerAddress {
        ServerAddress::new("localhost", 25565).unwrap()
    }

    #[test]
    fn test_status_handshake_wire_bytes() {
        let handshake = Handshake::status(DEFAULT_PROTOCOL_VERSION, &localhost());
        let framed = frame(&handshake.to_raw().encode());

        let mut expected = vec![0x0f, 0x00, 0x2f, 0x09];
        expected.extend_from_slice(b"localhost");
        expected.extend_from_slice(&[0x63, 0xdd, 0x01]);

        assert_eq!(&framed[..], &expected[..]);
    }

    #[test]
    fn test_handshake_roundtrip() {
        let original = Handshake {
            protocol_version: 773,
            server_address: "mc.example.org".to_string(),
            server_port: 25565,
            next_state: NextState::Login,
        };

        let raw = original.to_raw();
        let parsed = Handshake::from_raw(&raw).unwrap();

        assert_eq!(parsed, original);
    }

    #[test]
    fn test_negative_protocol_version() {
        let original = Handshake {
            protocol_version: -1,
            ..Handshake::status(0, &localhost())
        };

        let raw = original.to_raw();
        assert_eq!(&raw.payload[..5], [0xff, 0xff, 0xff, 0xff, 0x0f]);
        assert_eq!(Handshake::from_raw(&raw).unwrap().protocol_version, -1);
    }

    #[test]
    fn test_truncated_port() {
        let mut payload = BytesMut::new();
        write_varint(&mut payload, 47);
        write_string(&mut payload, "localhost");
        payload.put_u8(0x63);

        let result = Handshake::from_raw(&RawPacket::new(0x00, payload));
        assert!(matches!(result, Err(ProtocolError::ShortRead { .. })));
    }

    #[test]
    fn test_wrong_packet_id() {
        let result = Handshake::from_raw(&RawPacket::empty(0x01));
        assert!(matches!(result, Err(ProtocolError::InvalidPacketId(0x01))));
    }

    #[test]
    fn test_handshake_packet_metadata() {
        assert_eq!(Handshake::ID, 0x00);
        assert_eq!(Handshake::STATE, ConnectionState::Handshaking);
    }

    #[test]
    fn test_next_state_conversion() {
        assert_eq!(NextState::try_from(1).unwrap(), NextState::Status);
        assert_eq!(NextState::try_from(2).unwrap(), NextState::Login);
        assert!(NextState::try_from(0).is_err());
        assert!(NextState::try_from(3).is_err());
    }
}
