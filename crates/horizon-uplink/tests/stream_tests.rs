//! Tests for the uplink event stream contract.

use std::time::Duration;

use futures_util::StreamExt;
use horizon_uplink::{DisconnectReason, EventStream, UplinkClient, UplinkConfig, UplinkEvent};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

async fn start_uplink() -> (UplinkClient, EventStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let config = UplinkConfig::new("127.0.0.1", port).no_handshake();
    let (client, events) = UplinkClient::start(config).await.unwrap();
    let (server, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();

    (client, events, server)
}

#[tokio::test]
async fn test_received_bytes_surface_as_data_events() {
    let (client, mut events, mut server) = start_uplink().await;

    server.write_all(b"incoming bytes").await.unwrap();

    let mut received = Vec::new();
    while received.len() < b"incoming bytes".len() {
        match timeout(WAIT, events.next()).await.unwrap() {
            Some(UplinkEvent::Data(bytes)) => received.extend(bytes),
            other => panic!("expected data, got {:?}", other),
        }
    }
    assert_eq!(received, b"incoming bytes");

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_echo_round_trip() {
    let (client, mut events, mut server) = start_uplink().await;

    // Echo back whatever arrives
    tokio::spawn(async move {
        let mut buf = vec![0u8; 1024];
        loop {
            match server.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if server.write_all(&buf[..n]).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    let sent = b"echo me through the uplink";
    client.send(sent.to_vec()).await.unwrap();

    let mut received = Vec::new();
    while received.len() < sent.len() {
        match timeout(WAIT, events.next()).await.unwrap() {
            Some(UplinkEvent::Data(bytes)) => received.extend(bytes),
            other => panic!("expected data, got {:?}", other),
        }
    }
    assert_eq!(received, sent);

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_inbound_exit_is_ordinary_data() {
    let (client, mut events, mut server) = start_uplink().await;

    server.write_all(b"exit").await.unwrap();

    let mut received = Vec::new();
    while received.len() < 4 {
        match timeout(WAIT, events.next()).await.unwrap() {
            Some(UplinkEvent::Data(bytes)) => received.extend(bytes),
            other => panic!("expected data, got {:?}", other),
        }
    }
    assert_eq!(received, b"exit");

    // "exit" from the peer carries no control meaning; the link stays up
    assert!(client.is_connected());
    server.write_all(b"more").await.unwrap();
    let mut received = Vec::new();
    while received.len() < 4 {
        match timeout(WAIT, events.next()).await.unwrap() {
            Some(UplinkEvent::Data(bytes)) => received.extend(bytes),
            other => panic!("expected data, got {:?}", other),
        }
    }
    assert_eq!(received, b"more");

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_peer_close_yields_single_disconnect_then_end() {
    let (client, mut events, server) = start_uplink().await;

    drop(server);

    let event = timeout(WAIT, events.next()).await.unwrap();
    assert!(matches!(
        event,
        Some(UplinkEvent::Disconnected(DisconnectReason::PeerClosed))
    ));
    assert!(timeout(WAIT, events.next()).await.unwrap().is_none());

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_data_precedes_terminal_event() {
    let (client, mut events, mut server) = start_uplink().await;

    server.write_all(b"last words").await.unwrap();
    server.shutdown().await.unwrap();

    let mut received = Vec::new();
    loop {
        match timeout(WAIT, events.next()).await.unwrap() {
            Some(UplinkEvent::Data(bytes)) => received.extend(bytes),
            Some(UplinkEvent::Disconnected(DisconnectReason::PeerClosed)) => break,
            other => panic!("expected data or disconnect, got {:?}", other),
        }
    }
    assert_eq!(received, b"last words");
    assert!(timeout(WAIT, events.next()).await.unwrap().is_none());

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_handle_drop_closes_queue_and_ends_stream() {
    let (client, mut events, _server) = start_uplink().await;

    drop(client);

    let event = timeout(WAIT, events.next()).await.unwrap();
    assert!(matches!(event, Some(UplinkEvent::ShutdownRequested)));
    assert!(timeout(WAIT, events.next()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_dropped_stream_keeps_link_alive() {
    let (client, events, mut server) = start_uplink().await;

    drop(events);

    // Received bytes are discarded without tearing the link down
    server.write_all(b"discarded").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(client.is_connected());

    // The write path still works
    client.send(b"still alive".to_vec()).await.unwrap();
    let mut buf = vec![0u8; b"still alive".len()];
    timeout(WAIT, server.read_exact(&mut buf))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(buf, b"still alive");

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_stream_works_with_combinators() {
    let (client, events, mut server) = start_uplink().await;

    server.write_all(b"one").await.unwrap();
    server.shutdown().await.unwrap();

    let collected: Vec<UplinkEvent> = timeout(WAIT, events.collect()).await.unwrap();

    assert!(matches!(
        collected.last(),
        Some(UplinkEvent::Disconnected(DisconnectReason::PeerClosed))
    ));
    let bytes: Vec<u8> = collected
        .iter()
        .filter_map(|event| match event {
            UplinkEvent::Data(data) => Some(data.clone()),
            _ => None,
        })
        .flatten()
        .collect();
    assert_eq!(bytes, b"one");

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_zero_read_buffer_still_receives() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let config = UplinkConfig::new("127.0.0.1", port).no_handshake().read_buffer_size(0);
    let (client, mut events) = UplinkClient::start(config).await.unwrap();
    let (mut server, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();

    server.write_all(b"hello").await.unwrap();

    // The floored buffer delivers the bytes one event at a time
    let mut received = Vec::new();
    while received.len() < b"hello".len() {
        match timeout(WAIT, events.next()).await.unwrap() {
            Some(UplinkEvent::Data(bytes)) => received.extend(bytes),
            other => panic!("expected data, got {:?}", other),
        }
    }
    assert_eq!(received, b"hello");
    assert!(client.is_connected());

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_reset_surfaces_as_disconnect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    // Keep the default handshake so the server holds unread data
    let config = UplinkConfig::new("127.0.0.1", port);
    let (client, mut events) = UplinkClient::start(config).await.unwrap();
    let (server, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();

    // Dropping with unread data usually answers with RST instead of FIN;
    // either way the stream must end with a single disconnect event
    drop(server);

    let event = timeout(WAIT, events.next()).await.unwrap();
    assert!(matches!(event, Some(UplinkEvent::Disconnected(_))));
    assert!(timeout(WAIT, events.next()).await.unwrap().is_none());

    client.close().await.unwrap();
}
