//! Varint encoding/decoding for the Minecraft protocol.
//!
//! Minecraft uses a variable-length integer encoding where each byte
//! uses 7 bits for data and 1 bit to indicate if more bytes follow.
//! Groups are little-endian, so the least significant 7 bits come first.

use std::io;

use bytes::BufMut;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{ProtocolError, Result};

/// Segment bits mask (lower 7 bits).
const SEGMENT_BITS: u8 = 0x7F;

/// Continue bit (high bit).
const CONTINUE_BIT: u8 = 0x80;

/// Longest encoding of a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

/// Encode a value into a freshly allocated buffer.
#[must_use]
pub fn encode(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(varint_len(value));
    write_varint(&mut buf, value);
    buf
}

/// Write a varint to a buffer.
///
/// Returns the number of bytes written.
pub fn write_varint(buf: &mut impl BufMut, mut value: u64) -> usize {
    let mut bytes_written = 0;

    loop {
        #[allow(clippy::cast_possible_truncation)]
        let mut byte = (value & u64::from(SEGMENT_BITS)) as u8;
        value >>= 7;

        if value != 0 {
            byte |= CONTINUE_BIT;
        }

        buf.put_u8(byte);
        bytes_written += 1;

        if value == 0 {
            break;
        }
    }

    bytes_written
}

/// Decode a varint starting at `offset` in `buf`.
///
/// Returns the value and the number of bytes it occupied.
///
/// # Errors
///
/// Returns [`ProtocolError::TruncatedVarint`] if the continuation chain runs
/// past the end of `buf`, or does not terminate within [`MAX_VARINT_LEN`]
/// bytes without overflowing 64 bits.
pub fn decode(buf: &[u8], offset: usize) -> Result<(u64, usize)> {
    let bytes = buf.get(offset..).unwrap_or_default();
    let mut value: u64 = 0;

    for (index, &byte) in bytes.iter().take(MAX_VARINT_LEN).enumerate() {
        // the tenth byte only has room for the top bit of a u64
        if index == MAX_VARINT_LEN - 1 && byte > 1 {
            return Err(ProtocolError::TruncatedVarint);
        }

        value |= u64::from(byte & SEGMENT_BITS) << (7 * index);

        if byte & CONTINUE_BIT == 0 {
            return Ok((value, index + 1));
        }
    }

    Err(ProtocolError::TruncatedVarint)
}

/// Read a varint from an async reader.
///
/// # Errors
///
/// Returns an error if:
/// - The stream ends before the varint terminates ([`ProtocolError::ShortRead`])
/// - The varint is longer than [`MAX_VARINT_LEN`] bytes
/// - Any other I/O error occurs
pub async fn read_varint<R: AsyncRead + Unpin>(reader: &mut R) -> Result<u64> {
    let mut value: u64 = 0;

    for index in 0..MAX_VARINT_LEN {
        let byte = match reader.read_u8().await {
            Ok(byte) => byte,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(ProtocolError::ShortRead {
                    expected: index + 1,
                    read: index,
                });
            }
            Err(e) => return Err(e.into()),
        };

        if index == MAX_VARINT_LEN - 1 && byte > 1 {
            return Err(ProtocolError::TruncatedVarint);
        }

        value |= u64::from(byte & SEGMENT_BITS) << (7 * index);

        if byte & CONTINUE_BIT == 0 {
            return Ok(value);
        }
    }

    Err(ProtocolError::TruncatedVarint)
}

/// Calculate the number of bytes needed to encode a varint.
#[must_use]
pub const fn varint_len(value: u64) -> usize {
    if value == 0 {
        return 1;
    }

    let bits_needed = 64 - value.leading_zeros();
    (bits_needed as usize).div_ceil(7)
}
