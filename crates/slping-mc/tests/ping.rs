use std::time::Duration;

use slping_mc::codec::{frame, read_packet};
use slping_mc::packets::{Handshake, NextState, StatusRequest};
use slping_mc::varint::write_varint;
use slping_mc::{ProtocolError, ServerAddress, StatusClient, ping};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const STATUS_JSON: &str = r#"{"version":{"name":"1.20","protocol":763},"players":{"max":20,"online":3,"sample":[]},"description":"A Server","favicon":""}"#;

fn status_frame(json: &str) -> Vec<u8> {
    let mut payload = vec![0x00];
    write_varint(&mut payload, json.len() as u64);
    payload.extend_from_slice(json.as_bytes());
    frame(&payload).to_vec()
}

/// What the fake server saw from one client.
struct Observed {
    handshake: Handshake,
    /// Whether the client closed its side after the reply.
    saw_close: bool,
}

/// Accept `connections` clients, answer each with `reply` and wait for the
/// client to hang up.
async fn fake_server(reply: Vec<u8>, connections: usize) -> (u16, JoinHandle<Vec<Observed>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let mut observed = Vec::new();
        for _ in 0..connections {
            let (mut stream, _) = listener.accept().await.unwrap();

            let handshake = Handshake::from_raw(&read_packet(&mut stream).await.unwrap()).unwrap();
            StatusRequest::from_raw(&read_packet(&mut stream).await.unwrap()).unwrap();

            stream.write_all(&reply).await.unwrap();
            stream.shutdown().await.unwrap();

            let mut rest = Vec::new();
            let saw_close = stream.read_to_end(&mut rest).await.is_ok() && rest.is_empty();

            observed.push(Observed {
                handshake,
                saw_close,
            });
        }
        observed
    });

    (port, handle)
}

#[tokio::test]
async fn test_ping_end_to_end() {
    let (port, server) = fake_server(status_frame(STATUS_JSON), 1).await;

    let status = ping("127.0.0.1", port).await.unwrap();
    assert_eq!(status.version.name, "1.20");
    assert_eq!(status.version.protocol, 763);
    assert_eq!(status.players.max, 20);
    assert_eq!(status.players.online, 3);
    assert_eq!(status.motd(), "A Server");

    let observed = server.await.unwrap();
    let seen = &observed[0];
    assert_eq!(seen.handshake.protocol_version, 0x2f);
    assert_eq!(seen.handshake.server_address, "127.0.0.1");
    assert_eq!(seen.handshake.server_port, port);
    assert_eq!(seen.handshake.next_state, NextState::Status);
    assert!(seen.saw_close);
}

#[tokio::test]
async fn test_short_read_closes_connection() {
    let mut reply = status_frame(STATUS_JSON);
    reply.truncate(reply.len() - 10);
    let (port, server) = fake_server(reply, 1).await;

    let result = ping("127.0.0.1", port).await;
    assert!(
        matches!(result, Err(ProtocolError::ShortRead { .. })),
        "got {result:?}"
    );

    let observed = server.await.unwrap();
    assert!(observed[0].saw_close);
}

#[tokio::test]
async fn test_malformed_json_body() {
    let (port, server) = fake_server(status_frame(r#"{"version":{"name":"1.20","#), 1).await;

    let result = ping("127.0.0.1", port).await;
    assert!(
        matches!(result, Err(ProtocolError::MalformedBody(_))),
        "got {result:?}"
    );
    assert!(server.await.unwrap()[0].saw_close);
}

#[tokio::test]
async fn test_oversized_length_header() {
    let mut reply = Vec::new();
    write_varint(&mut reply, u64::from(u32::MAX));
    let (port, server) = fake_server(reply, 1).await;

    let result = ping("127.0.0.1", port).await;
    assert!(
        matches!(result, Err(ProtocolError::InvalidLength { .. })),
        "got {result:?}"
    );
    server.await.unwrap();
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = ping("127.0.0.1", port).await;
    assert!(
        matches!(result, Err(ProtocolError::Connection { .. })),
        "got {result:?}"
    );
}

#[tokio::test]
async fn test_bad_address_never_dials() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let result = format!("127.0.0.1:{port}:extra").parse::<ServerAddress>();
    assert!(matches!(result, Err(ProtocolError::Configuration(_))));

    let result = ping("bad host", port).await;
    assert!(matches!(result, Err(ProtocolError::Configuration(_))));

    let accepted = tokio::time::timeout(Duration::from_millis(100), listener.accept()).await;
    assert!(accepted.is_err(), "no connection should have been made");
}

#[tokio::test]
async fn test_concurrent_pings_are_independent() {
    let (port, server) = fake_server(status_frame(STATUS_JSON), 3).await;
    let address = ServerAddress::new("127.0.0.1", port).unwrap();
    let client = StatusClient::new().with_read_timeout(Duration::from_secs(2));

    let (a, b, c) = tokio::join!(
        client.ping(&address),
        client.ping(&address),
        client.ping(&address)
    );
    for status in [a, b, c] {
        assert_eq!(status.unwrap().players.max, 20);
    }

    let observed = server.await.unwrap();
    assert_eq!(observed.len(), 3);
    assert!(observed.iter().all(|seen| seen.saw_close));
}
