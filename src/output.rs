//! Human-readable rendering of a status response.

use std::fmt;

use slping_mc::{ProtocolVersion, StatusResponse};

/// Multi-line summary of a [`StatusResponse`].
pub struct Summary<'a>(pub &'a StatusResponse);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.0;

        write!(
            f,
            "Version:  {} (protocol {}",
            status.version.name, status.version.protocol
        )?;
        if let Some(known) = ProtocolVersion::from_raw(status.version.protocol) {
            write!(f, ", {}", known.name())?;
        }
        writeln!(f, ")")?;

        writeln!(
            f,
            "Players:  {}/{}",
            status.players.online, status.players.max
        )?;
        let names: Vec<&str> = status.players.sample_names().collect();
        if !names.is_empty() {
            writeln!(f, "          {}", names.join(", "))?;
        }

        for (i, line) in status.motd().lines().enumerate() {
            let label = if i == 0 { "MOTD:" } else { "" };
            writeln!(f, "{label:<10}{}", line.trim_end())?;
        }

        if status.has_favicon() {
            writeln!(f, "Favicon:  yes ({} bytes)", status.favicon.len())
        } else {
            writeln!(f, "Favicon:  none")
        }
    }
}
