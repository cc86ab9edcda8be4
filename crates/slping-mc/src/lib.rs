//! Minecraft Server List Ping client.
//!
//! This crate provides the packet codec for the handshake and status
//! states of the Minecraft protocol, and a client that uses it to query a
//! server's status.
//!
//! ```no_run
//! # async fn run() -> slping_mc::Result<()> {
//! let status = slping_mc::ping("localhost", 25565).await?;
//! println!("{} / {} players", status.players.online, status.players.max);
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod client;
pub mod codec;
pub mod error;
pub mod packets;
pub mod varint;
pub mod version;

pub use address::{DEFAULT_PORT, ServerAddress};
pub use client::{StatusClient, ping};
pub use error::{ProtocolError, Result};
pub use packets::{Players, StatusResponse, Version};
pub use version::{DEFAULT_PROTOCOL_VERSION, ProtocolVersion};
