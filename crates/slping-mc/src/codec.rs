//! Packet framing codec for Minecraft protocol.
//!
//! Minecraft packets are framed as:
//! - `[VarInt length][payload...]`
//!
//! where the payload itself starts with the packet ID. The length covers
//! the payload but not itself.

use std::io;

use bytes::{Buf, BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ProtocolError, Result};
use crate::varint::{read_varint, varint_len, write_varint};

/// Maximum packet size (2 MiB, same as vanilla).
pub const MAX_PACKET_SIZE: usize = 2 * 1024 * 1024;

/// Wrap a payload in its length prefix.
///
/// The payload is copied verbatim; only its length is inspected.
#[must_use]
pub fn frame(payload: &[u8]) -> BytesMut {
    let len = payload.len() as u64;
    let mut buf = BytesMut::with_capacity(varint_len(len) + payload.len());
    write_varint(&mut buf, len);
    buf.put_slice(payload);
    buf
}

/// Read one framed payload from an async reader.
///
/// # Errors
///
/// Returns an error if:
/// - The stream closes before the declared length is read ([`ProtocolError::ShortRead`])
/// - The declared length exceeds [`MAX_PACKET_SIZE`] ([`ProtocolError::InvalidLength`])
/// - The length header is malformed or another I/O error occurs
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<BytesMut> {
    let declared = read_varint(reader).await?;

    let length = usize::try_from(declared)
        .ok()
        .filter(|len| *len <= MAX_PACKET_SIZE)
        .ok_or(ProtocolError::InvalidLength {
            len: declared,
            max: MAX_PACKET_SIZE,
        })?;

    let mut data = BytesMut::zeroed(length);
    let mut filled = 0;

    while filled < length {
        match reader.read(&mut data[filled..]).await {
            Ok(0) => {
                return Err(ProtocolError::ShortRead {
                    expected: length,
                    read: filled,
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(data)
}

/// A raw packet with its ID and body.
#[derive(Debug, Clone)]
pub struct RawPacket {
    /// The packet ID.
    pub id: u64,
    /// The packet body (without the packet ID).
    pub payload: BytesMut,
}

impl RawPacket {
    /// Create a new raw packet with the given ID and payload.
    #[must_use]
    pub const fn new(id: u64, payload: BytesMut) -> Self {
        Self { id, payload }
    }

    /// Create a new raw packet with the given ID and an empty payload.
    #[must_use]
    pub fn empty(id: u64) -> Self {
        Self {
            id,
            payload: BytesMut::new(),
        }
    }

    /// Split an unframed payload into its packet ID and body.
    ///
    /// # Errors
    ///
    /// Returns an error if the packet ID varint is malformed.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let (id, id_len) = crate::varint::decode(data, 0)?;
        Ok(Self {
            id,
            payload: BytesMut::from(&data[id_len..]),
        })
    }

    /// Encode as `[VarInt id][payload]`, ready for [`frame`].
    #[must_use]
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(varint_len(self.id) + self.payload.len());
        write_varint(&mut buf, self.id);
        buf.put_slice(&self.payload);
        buf
    }
}

/// Read a raw packet from an async reader.
///
/// # Errors
///
/// Returns an error if the frame cannot be read or its packet ID is malformed.
pub async fn read_packet<R: AsyncRead + Unpin>(reader: &mut R) -> Result<RawPacket> {
    let data = read_frame(reader).await?;
    RawPacket::decode(&data)
}

/// Write a raw packet to an async writer.
///
/// The whole frame goes out in a single write, then the writer is flushed.
///
/// # Errors
///
/// Returns an error if an I/O error occurs.
pub async fn write_packet<W: AsyncWrite + Unpin>(writer: &mut W, packet: &RawPacket) -> Result<()> {
    let buf = frame(&packet.encode());
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

/// Read a Minecraft string from a buffer.
///
/// Minecraft strings are: `[VarInt length][UTF-8 bytes]`
///
/// # Errors
///
/// Returns an error if the string exceeds `max_len` bytes, is cut short, or
/// is not valid UTF-8.
pub fn read_string(buf: &mut impl Buf, max_len: usize) -> Result<String> {
    let len = read_varint_from_buf(buf)?;

    let len = usize::try_from(len)
        .ok()
        .filter(|len| *len <= max_len)
        .ok_or(ProtocolError::StringTooLong { len, max: max_len })?;

    if buf.remaining() < len {
        return Err(ProtocolError::ShortRead {
            expected: len,
            read: buf.remaining(),
        });
    }

    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);

    String::from_utf8(bytes)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()).into())
}

/// Write a Minecraft string to a buffer.
pub fn write_string(buf: &mut impl BufMut, s: &str) {
    let bytes = s.as_bytes();
    write_varint(buf, bytes.len() as u64);
    buf.put_slice(bytes);
}

/// Read a varint from a buffer, advancing past it.
///
/// # Errors
///
/// Returns an error if the buffer runs out or the varint is too long.
pub fn read_varint_from_buf(buf: &mut impl Buf) -> Result<u64> {
    let (value, len) = crate::varint::decode(buf.chunk(), 0)?;
    buf.advance(len);
    Ok(value)
}
