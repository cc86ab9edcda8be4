//! Minecraft protocol packets.
//!
//! Only the two states a server list ping passes through are modelled:
//! - Handshake: Initial connection state
//! - Status: Server list ping

pub mod handshake;
pub mod status;
pub mod traits;

pub use handshake::{Handshake, NextState};
pub use status::{Players, SampleEntry, StatusRequest, StatusResponse, Version};
pub use traits::{ConnectionState, Packet};
