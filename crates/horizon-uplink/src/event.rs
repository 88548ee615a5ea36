//! Link events and the stream that delivers them.

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::mpsc;

/// Why a link stopped carrying data.
#[derive(Debug)]
pub enum DisconnectReason {
    /// The peer closed its end of the connection.
    PeerClosed,
    /// A socket read failed.
    ReadFailed(std::io::Error),
    /// A socket write failed.
    WriteFailed(std::io::Error),
}

impl std::fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PeerClosed => write!(f, "peer closed the connection"),
            Self::ReadFailed(e) => write!(f, "socket read failed: {e}"),
            Self::WriteFailed(e) => write!(f, "socket write failed: {e}"),
        }
    }
}

/// An event observed on the uplink.
#[derive(Debug)]
pub enum UplinkEvent {
    /// Bytes received from the peer, as one socket read.
    Data(Vec<u8>),
    /// The link went down; no further data will arrive.
    Disconnected(DisconnectReason),
    /// A locally requested shutdown completed.
    ShutdownRequested,
}

/// A stream of uplink events.
///
/// Created once per link by [`UplinkClient::start`](crate::UplinkClient::start).
/// Yields zero or more [`UplinkEvent::Data`] events followed by exactly one
/// terminal event ([`UplinkEvent::Disconnected`] or
/// [`UplinkEvent::ShutdownRequested`]), after which it is exhausted.
///
/// Dropping the stream while the link is up does not close the link; the
/// multiplexer keeps running and discards received bytes.
pub struct EventStream {
    receiver: mpsc::Receiver<UplinkEvent>,
}

impl EventStream {
    pub(crate) fn new(receiver: mpsc::Receiver<UplinkEvent>) -> Self {
        Self { receiver }
    }

    /// Get the next event from the link.
    ///
    /// Returns `None` once the terminal event has been consumed.
    pub async fn next(&mut self) -> Option<UplinkEvent> {
        self.receiver.recv().await
    }

    /// Get the next event if one is already queued, without waiting.
    pub fn try_next(&mut self) -> Option<UplinkEvent> {
        self.receiver.try_recv().ok()
    }
}

impl futures_util::Stream for EventStream {
    type Item = UplinkEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}
