//! The uplink client handle and its lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::UplinkConfig;
use crate::connect;
use crate::error::{CloseError, ConnectError, SendError};
use crate::event::EventStream;
use crate::mux::{ExitReason, Multiplexer};
use crate::queue::SendQueue;
use crate::state::LinkState;

/// A queued TCP uplink client.
///
/// The client decouples producers from the socket: any task may enqueue
/// payloads through [`send`](Self::send) while a single multiplexer task
/// owns the socket, forwards queued payloads to it, and delivers received
/// bytes on the [`EventStream`] returned by [`start`](Self::start).
///
/// # Example
///
/// ```ignore
/// let config = UplinkConfig::new("127.0.0.1", 9000).no_delay(true);
/// let (client, mut events) = UplinkClient::start(config).await?;
///
/// client.send(b"telemetry frame".to_vec()).await?;
///
/// while let Some(event) = events.next().await {
///     match event {
///         UplinkEvent::Data(bytes) => println!("Received {} bytes", bytes.len()),
///         UplinkEvent::Disconnected(reason) => println!("Link down: {}", reason),
///         UplinkEvent::ShutdownRequested => break,
///     }
/// }
///
/// client.close().await?;
/// ```
///
/// Dropping the client without calling [`close`](Self::close) also stops
/// the multiplexer, because the write queue closes, but without waiting
/// for the task to finish.
pub struct UplinkClient {
    config: UplinkConfig,
    local_addr: Option<SocketAddr>,
    peer_addr: Option<SocketAddr>,
    queue: SendQueue,
    state: Arc<Mutex<LinkState>>,
    io_task: Mutex<Option<JoinHandle<ExitReason>>>,
}

impl UplinkClient {
    /// Connect to the configured peer and start the multiplexer task.
    ///
    /// Returns the client handle plus the stream of link events. On failure
    /// everything acquired before the failing step has already been released
    /// when the error is returned.
    pub async fn start(config: UplinkConfig) -> Result<(Self, EventStream), ConnectError> {
        let stream = connect::establish(&config).await?;

        let local_addr = stream.local_addr().ok();
        let peer_addr = stream.peer_addr().ok();

        let (queue, commands) = SendQueue::channel(&config.queue);
        let (event_tx, event_rx) = mpsc::channel(config.event_capacity.max(1));

        let (reader, writer) = stream.into_split();
        let mux = Multiplexer::new(
            reader,
            writer,
            commands,
            event_tx,
            config.socket.read_buffer_size,
        );

        let state = Arc::new(Mutex::new(LinkState::Connected));
        let task_state = state.clone();
        let io_task = tokio::spawn(async move {
            let reason = mux.run().await;
            *task_state.lock() = LinkState::Closed;
            reason
        });

        tracing::debug!(target: "horizon_uplink::client", "Uplink to {} started", config.address());

        let client = Self {
            config,
            local_addr,
            peer_addr,
            queue,
            state,
            io_task: Mutex::new(Some(io_task)),
        };

        Ok((client, EventStream::new(event_rx)))
    }

    /// Enqueue a payload for transmission.
    ///
    /// Payloads reach the socket verbatim and in enqueue order, one socket
    /// write per payload. Under [`OverflowPolicy::Block`](crate::OverflowPolicy::Block)
    /// a full queue makes this wait for a slot; under
    /// [`OverflowPolicy::Reject`](crate::OverflowPolicy::Reject) it fails
    /// with [`SendError::QueueFull`]. Once the link is down every call
    /// fails with [`SendError::Closed`].
    ///
    /// Returns the number of bytes enqueued.
    pub async fn send(&self, payload: impl Into<Vec<u8>>) -> Result<usize, SendError> {
        let payload = payload.into();
        let len = payload.len();
        self.queue.push(payload).await?;
        Ok(len)
    }

    /// Enqueue a payload without waiting, regardless of overflow policy.
    ///
    /// Returns the number of bytes enqueued.
    pub fn try_send(&self, payload: impl Into<Vec<u8>>) -> Result<usize, SendError> {
        let payload = payload.into();
        let len = payload.len();
        self.queue.try_push(payload)?;
        Ok(len)
    }

    /// Request an orderly shutdown of the link.
    ///
    /// The multiplexer forwards everything enqueued before this call, emits
    /// [`UplinkEvent::ShutdownRequested`](crate::UplinkEvent::ShutdownRequested),
    /// and exits. Fails with [`SendError::Closed`] if the link is already
    /// down.
    pub async fn shutdown(&self) -> Result<(), SendError> {
        self.queue.push_shutdown().await
    }

    /// Shut the link down and wait for the multiplexer task to finish.
    ///
    /// Safe to call while the multiplexer is active: the task observes the
    /// shutdown request, emits the terminal event, and releases the socket
    /// before `close` returns. If the task already exited on its own the
    /// wait completes immediately. A second `close` finds nothing left to
    /// join and returns `Ok(())` without waiting.
    pub async fn close(&self) -> Result<(), CloseError> {
        let task = self.io_task.lock().take();
        let Some(task) = task else {
            return Ok(());
        };

        {
            let mut state = self.state.lock();
            if *state == LinkState::Connected {
                *state = LinkState::Closing;
            }
        }

        // The queue is already gone if the multiplexer tore down first
        let _ = self.queue.push_shutdown().await;

        let reason = task.await?;
        *self.state.lock() = LinkState::Closed;

        tracing::debug!(target: "horizon_uplink::client", "Uplink to {} closed ({:?})", self.config.address(), reason);

        Ok(())
    }

    /// Get the current link state.
    pub fn state(&self) -> LinkState {
        *self.state.lock()
    }

    /// Check if the multiplexer is still serving the link.
    pub fn is_connected(&self) -> bool {
        self.state() == LinkState::Connected
    }

    /// Get the host this client was configured to connect to.
    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Get the port this client was configured to connect to.
    pub fn port(&self) -> u16 {
        self.config.port
    }

    /// Get the full address (host:port) this client connects to.
    pub fn address(&self) -> String {
        self.config.address()
    }

    /// Get the remote socket address of the connection.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Get the local socket address of the connection.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

impl std::fmt::Debug for UplinkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UplinkClient")
            .field("address", &self.config.address())
            .field("state", &self.state())
            .finish()
    }
}
