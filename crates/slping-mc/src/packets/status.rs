//! Status protocol packets.
//!
//! The status protocol is used by clients to query server information
//! without joining. This packet format is stable across all supported
//! protocol versions.

use std::collections::BTreeMap;

use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::AsyncRead;
use tracing::warn;

use crate::codec::{RawPacket, read_frame, write_string};
use crate::error::{ProtocolError, Result};
use crate::packets::traits::{ConnectionState, Packet};
use crate::varint;

/// Status Request packet (client -> server).
///
/// This is an empty packet that requests server status.
#[derive(Debug, Clone, Default)]
pub struct StatusRequest;

impl Packet for StatusRequest {
    const ID: u64 = 0x00;
    const STATE: ConnectionState = ConnectionState::Status;
}

impl StatusRequest {
    /// Parse a status request from a raw packet.
    ///
    /// # Errors
    ///
    /// Returns an error if the packet ID is invalid.
    pub const fn from_raw(packet: &RawPacket) -> Result<Self> {
        if packet.id != Self::ID {
            return Err(ProtocolError::InvalidPacketId(packet.id));
        }
        Ok(Self)
    }

    /// Encode to a raw packet.
    #[must_use]
    pub fn to_raw(&self) -> RawPacket {
        RawPacket::empty(Self::ID)
    }
}

/// Server software version as reported in the status response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Version {
    /// Human readable version, e.g. `1.20.1` or a proxy brand.
    pub name: String,
    /// Protocol number the server speaks.
    pub protocol: i32,
}

/// One entry of the online player sample, usually `name` and `id`.
pub type SampleEntry = BTreeMap<String, String>;

/// Player counts as reported in the status response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Players {
    /// Player slots the server advertises.
    pub max: i64,
    /// Players currently connected.
    pub online: i64,
    /// Absent or `null` when the server hides its player list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<Vec<SampleEntry>>,
}

impl Players {
    /// Names from the player sample, in the order the server sent them.
    pub fn sample_names(&self) -> impl Iterator<Item = &str> {
        self.sample
            .iter()
            .flatten()
            .filter_map(|entry| entry.get("name").map(String::as_str))
    }
}

/// Status Response packet (server -> client).
///
/// The decoded JSON document describing the server. Unknown fields are
/// ignored and missing ones fall back to their empty value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusResponse {
    /// Server software name and protocol number.
    pub version: Version,
    /// Player counts and sample.
    pub players: Players,
    /// Plain string or chat component; see [`StatusResponse::motd`].
    pub description: Value,
    /// `data:image/png;base64,...` icon, empty when the server has none.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub favicon: String,
}

impl Packet for StatusResponse {
    const ID: u64 = 0x00;
    const STATE: ConnectionState = ConnectionState::Status;
}

impl StatusResponse {
    /// Read one framed status response from `reader`.
    ///
    /// # Errors
    ///
    /// Returns a framing error if the packet cannot be read, otherwise any
    /// error from [`StatusResponse::decode`].
    pub async fn read_from<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Self> {
        let payload = read_frame(reader).await?;
        Self::decode(&payload)
    }

    /// Decode an unframed status response payload.
    ///
    /// The payload is `[VarInt packet_id][VarInt json_len][json...]`. Both
    /// varints are skipped; everything after them is parsed as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedHeader`] if either varint cannot be
    /// decoded and [`ProtocolError::MalformedBody`] if the rest is not a
    /// status document.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let (packet_id, id_len) = varint::decode(payload, 0)
            .map_err(|_| ProtocolError::MalformedHeader("packet ID"))?;

        if packet_id != Self::ID {
            warn!(
                packet_id,
                state = ?Self::STATE,
                "Unexpected status response packet ID"
            );
        }

        let (declared_len, len_len) = varint::decode(payload, id_len)
            .map_err(|_| ProtocolError::MalformedHeader("JSON length"))?;

        let body = &payload[id_len + len_len..];

        if declared_len != body.len() as u64 {
            warn!(
                declared = declared_len,
                actual = body.len(),
                "Status response JSON length does not match packet length"
            );
        }

        let document: Value = serde_json::from_slice(body).map_err(ProtocolError::MalformedBody)?;

        // Derived struct visitors also accept arrays, so the shape is checked first.
        expect_object(Some(&document), "status")?;
        expect_object(document.get("version"), "version")?;
        expect_object(document.get("players"), "players")?;

        serde_json::from_value(document).map_err(ProtocolError::MalformedBody)
    }

    /// Encode to a raw packet.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized.
    pub fn to_raw(&self) -> Result<RawPacket> {
        let json = serde_json::to_string(self).map_err(ProtocolError::MalformedBody)?;
        let mut payload = BytesMut::new();
        write_string(&mut payload, &json);
        Ok(RawPacket::new(Self::ID, payload))
    }

    /// The description flattened to plain text.
    ///
    /// Chat components contribute their `text` followed by their `extra`
    /// children; legacy `§` formatting codes are dropped.
    #[must_use]
    pub fn motd(&self) -> String {
        let mut raw = String::new();
        flatten_component(&self.description, &mut raw);

        let mut motd = String::with_capacity(raw.len());
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            if c == '§' {
                chars.next();
            } else {
                motd.push(c);
            }
        }
        motd
    }

    /// Whether the server sent an icon.
    #[must_use]
    pub fn has_favicon(&self) -> bool {
        !self.favicon.is_empty()
    }
}

/// Reject a present value that is not a JSON object.
fn expect_object(value: Option<&Value>, field: &str) -> Result<()> {
    match value {
        Some(value) if !value.is_object() => Err(ProtocolError::MalformedBody(
            serde::de::Error::custom(format!("{field} must be a JSON object, got {value}")),
        )),
        _ => Ok(()),
    }
}

fn flatten_component(value: &Value, out: &mut String) {
    match value {
        Value::String(text) => out.push_str(text),
        Value::Array(parts) => {
            for part in parts {
                flatten_component(part, out);
            }
        }
        Value::Object(component) => {
            if let Some(text) = component.get("text") {
                flatten_component(text, out);
            }
            if let Some(extra) = component.get("extra") {
                flatten_component(extra, out);
            }
        }
        _ => {}
    }
}
