//! Protocol version definitions.
//!
//! The status exchange looks the same in every release since 1.7, so the
//! version a client announces mostly matters to servers that tailor their
//! reply to it. [`DEFAULT_PROTOCOL_VERSION`] is what the client sends unless
//! told otherwise.

/// Protocol version announced in the handshake by default (47, Minecraft 1.8).
pub const DEFAULT_PROTOCOL_VERSION: i32 = ProtocolVersion::V47.as_raw();

/// Well-known Minecraft protocol versions.
///
/// Servers may report any number; this table only names the common ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ProtocolVersion {
    /// Protocol version 47 (Minecraft 1.8.x)
    V47,

    /// Protocol version 340 (Minecraft 1.12.2)
    V340,

    /// Protocol version 754 (Minecraft 1.16.4/1.16.5)
    V754,

    /// Protocol version 763 (Minecraft 1.20/1.20.1)
    V763,

    /// Protocol version 765 (Minecraft 1.20.3/1.20.4)
    V765,

    /// Protocol version 773 (Minecraft 1.21.9/1.21.10)
    V773,
}

impl ProtocolVersion {
    /// Attempt to create a `ProtocolVersion` from a raw protocol version number.
    ///
    /// Returns `None` if the version is not in the table.
    #[must_use]
    pub const fn from_raw(version: i32) -> Option<Self> {
        match version {
            47 => Some(Self::V47),
            340 => Some(Self::V340),
            754 => Some(Self::V754),
            763 => Some(Self::V763),
            765 => Some(Self::V765),
            773 => Some(Self::V773),
            _ => None,
        }
    }

    /// Get the raw protocol version number.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        match self {
            Self::V47 => 47,
            Self::V340 => 340,
            Self::V754 => 754,
            Self::V763 => 763,
            Self::V765 => 765,
            Self::V773 => 773,
        }
    }

    /// Gets a list of human-readable version names (e.g., `["1.21.10", "1.21.9"]`).
    #[must_use]
    pub const fn names(self) -> &'static [&'static str] {
        match self {
            Self::V47 => &["1.8.9", "1.8"],
            Self::V340 => &["1.12.2"],
            Self::V754 => &["1.16.5", "1.16.4"],
            Self::V763 => &["1.20.1", "1.20"],
            Self::V765 => &["1.20.4", "1.20.3"],
            Self::V773 => &["1.21.10", "1.21.9"],
        }
    }

    /// Gets the primary version name (e.g., "1.21.10").
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.names()[0]
    }
}
