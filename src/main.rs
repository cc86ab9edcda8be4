//! slping: query a Minecraft server's status over Server List Ping.
//!
//! Prints a short summary of the server's version, player counts and MOTD,
//! or the full status document with `--json`. Logging goes to stderr and is
//! controlled with `RUST_LOG`.

mod output;

use std::time::Duration;

use clap::Parser;
use slping_mc::{ServerAddress, StatusClient};
use tracing::info;

use crate::output::Summary;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server to ping, as `host` or `host:port`
    address: String,

    /// Port to connect to, overriding any port in ADDRESS
    #[arg(short, long, env = "SLPING_PORT")]
    port: Option<u16>,

    /// Connect timeout in milliseconds [default: 3000]
    #[arg(short, long = "timeout", env = "SLPING_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Status response timeout in milliseconds [default: 5000]
    #[arg(long = "read-timeout", env = "SLPING_READ_TIMEOUT_MS")]
    read_timeout_ms: Option<u64>,

    /// Protocol version to announce in the handshake [default: 47]
    #[arg(long, env = "SLPING_PROTOCOL", allow_negative_numbers = true)]
    protocol: Option<i32>,

    /// Print the status response as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn client(&self) -> StatusClient {
        let mut client = StatusClient::new();
        if let Some(ms) = self.timeout_ms {
            client = client.with_connect_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.read_timeout_ms {
            client = client.with_read_timeout(Duration::from_millis(ms));
        }
        if let Some(protocol) = self.protocol {
            client = client.with_protocol_version(protocol);
        }
        client
    }

    fn server_address(&self) -> slping_mc::Result<ServerAddress> {
        let address: ServerAddress = self.address.parse()?;
        match self.port {
            Some(port) => address.with_port(port),
            None => Ok(address),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let address = args.server_address()?;
    let client = args.client();

    info!(
        %address,
        protocol = client.protocol_version(),
        "Pinging server"
    );

    let status = client.ping(&address).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print!("{}", Summary(&status));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use slping_mc::client::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT};
    use slping_mc::{DEFAULT_PORT, DEFAULT_PROTOCOL_VERSION};

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("slping").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["play.example.net"]);
        let address = args.server_address().unwrap();
        assert_eq!(address.port(), DEFAULT_PORT);

        let client = args.client();
        assert_eq!(client.connect_timeout(), DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(client.read_timeout(), DEFAULT_READ_TIMEOUT);
        assert_eq!(client.protocol_version(), DEFAULT_PROTOCOL_VERSION);
        assert!(!args.json);
    }

    #[test]
    fn test_port_flag_overrides_address() {
        let args = parse(&["localhost:1234", "--port", "25570"]);
        assert_eq!(args.server_address().unwrap().port(), 25570);
    }

    #[test]
    fn test_options() {
        let args = parse(&[
            "localhost",
            "--timeout",
            "250",
            "--read-timeout",
            "750",
            "--protocol",
            "-1",
            "--json",
        ]);
        let client = args.client();
        assert_eq!(client.connect_timeout(), Duration::from_millis(250));
        assert_eq!(client.read_timeout(), Duration::from_millis(750));
        assert_eq!(client.protocol_version(), -1);
        assert!(args.json);
    }

    #[test]
    fn test_bad_address() {
        let args = parse(&["localhost:notaport"]);
        assert!(args.server_address().is_err());
    }
}
