//! The event multiplexer: one task bridging the write queue and the socket.

use std::io;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;

use crate::event::{DisconnectReason, UplinkEvent};
use crate::queue::WriteCommand;

/// Why the multiplexer stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ExitReason {
    /// A shutdown command was dequeued.
    ShutdownRequested,
    /// Every producer handle was dropped.
    QueueClosed,
    /// The peer closed the connection.
    PeerDisconnected,
    /// A socket read failed.
    ReadFailed,
    /// A socket write failed.
    WriteFailed,
}

/// Bridges the write queue and the socket until either side ends.
///
/// Owns both socket halves and the queue consumer; all of it drops when
/// the bridge exits, which is what releases the connection.
pub(crate) struct Multiplexer {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
    commands: mpsc::Receiver<WriteCommand>,
    events: mpsc::Sender<UplinkEvent>,
    read_buffer_size: usize,
}

impl Multiplexer {
    pub(crate) fn new(
        reader: OwnedReadHalf,
        writer: OwnedWriteHalf,
        commands: mpsc::Receiver<WriteCommand>,
        events: mpsc::Sender<UplinkEvent>,
        read_buffer_size: usize,
    ) -> Self {
        Self {
            reader,
            writer,
            commands,
            events,
            read_buffer_size,
        }
    }

    /// Run the bridge loop until the link ends.
    ///
    /// Waits on the queue and the socket simultaneously and services one
    /// ready source per iteration. Emits [`UplinkEvent::Data`] for received
    /// bytes and exactly one terminal event before returning.
    pub(crate) async fn run(self) -> ExitReason {
        let Multiplexer {
            mut reader,
            mut writer,
            mut commands,
            events,
            read_buffer_size,
        } = self;

        // A read into an empty buffer returns zero, same as EOF
        let mut buffer = vec![0u8; read_buffer_size.max(1)];

        let reason = loop {
            tokio::select! {
                // Dequeue the next write command
                cmd = commands.recv() => {
                    match cmd {
                        Some(WriteCommand::Data(payload)) => {
                            if payload.is_empty() {
                                tracing::warn!(target: "horizon_uplink::mux", "Dequeued an empty payload, nothing to forward");
                                continue;
                            }
                            match writer.write_all(&payload).await {
                                Ok(()) => {}
                                Err(e) if e.kind() == io::ErrorKind::WriteZero => {
                                    tracing::warn!(target: "horizon_uplink::mux", "Socket accepted none of {} queued bytes", payload.len());
                                }
                                Err(e) => {
                                    tracing::error!(target: "horizon_uplink::mux", "Socket write failed: {}", e);
                                    let _ = events
                                        .send(UplinkEvent::Disconnected(DisconnectReason::WriteFailed(e)))
                                        .await;
                                    break ExitReason::WriteFailed;
                                }
                            }
                        }
                        Some(WriteCommand::Shutdown) => {
                            let _ = events.send(UplinkEvent::ShutdownRequested).await;
                            break ExitReason::ShutdownRequested;
                        }
                        None => {
                            // Every producer dropped without an explicit shutdown
                            let _ = events.send(UplinkEvent::ShutdownRequested).await;
                            break ExitReason::QueueClosed;
                        }
                    }
                }

                // Receive data from the peer
                result = reader.read(&mut buffer) => {
                    match result {
                        Ok(0) => {
                            // EOF - peer closed the connection
                            let _ = events
                                .send(UplinkEvent::Disconnected(DisconnectReason::PeerClosed))
                                .await;
                            break ExitReason::PeerDisconnected;
                        }
                        Ok(n) => {
                            // A dropped stream consumer discards the bytes; the link stays up
                            let _ = events.send(UplinkEvent::Data(buffer[..n].to_vec())).await;
                        }
                        Err(e) => {
                            tracing::error!(target: "horizon_uplink::mux", "Socket read failed: {}", e);
                            let _ = events
                                .send(UplinkEvent::Disconnected(DisconnectReason::ReadFailed(e)))
                                .await;
                            break ExitReason::ReadFailed;
                        }
                    }
                }
            }
        };

        if let Err(e) = writer.shutdown().await {
            tracing::warn!(target: "horizon_uplink::mux", "Socket shutdown failed: {}", e);
        }

        tracing::debug!(target: "horizon_uplink::mux", "Multiplexer exited: {:?}", reason);

        reason
    }
}
