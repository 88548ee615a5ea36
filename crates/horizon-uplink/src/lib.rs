//! Queued TCP uplink client for Horizon applications.
//!
//! This crate decouples data producers from a TCP socket:
//!
//! - **Write queue**: any task enqueues outbound payloads through a bounded
//!   queue without ever touching the socket
//! - **Event multiplexer**: a single task owns the socket, waits on the
//!   queue and the socket simultaneously, forwards queued payloads to the
//!   network, and turns everything it observes into typed events
//! - **Event stream**: received bytes, disconnects, and shutdown completion
//!   arrive as [`UplinkEvent`]s on a pull-based stream
//!
//! The payload is an undifferentiated byte stream: no framing, no length
//! prefixes, and no in-band control strings in either direction.
//!
//! # Quick start
//!
//! ```ignore
//! use horizon_uplink::{UplinkClient, UplinkConfig, UplinkEvent};
//!
//! let config = UplinkConfig::new("telemetry.example.com", 9000)
//!     .no_delay(true)
//!     .queue_capacity(128);
//!
//! let (client, mut events) = UplinkClient::start(config).await?;
//!
//! // Any number of tasks can enqueue payloads
//! client.send(b"frame 1".to_vec()).await?;
//! client.send(b"frame 2".to_vec()).await?;
//!
//! // One consumer drains the event stream
//! while let Some(event) = events.next().await {
//!     match event {
//!         UplinkEvent::Data(bytes) => handle(bytes),
//!         UplinkEvent::Disconnected(reason) => {
//!             eprintln!("Link down: {}", reason);
//!             break;
//!         }
//!         UplinkEvent::ShutdownRequested => break,
//!     }
//! }
//!
//! client.close().await?;
//! ```
//!
//! # Sending
//!
//! [`UplinkClient::send`] enqueues and returns the number of bytes
//! accepted; the multiplexer performs the socket write later, preserving
//! enqueue order. The queue is bounded: with
//! [`OverflowPolicy::Block`] (the default) a full queue makes `send` wait,
//! with [`OverflowPolicy::Reject`] it fails with
//! [`SendError::QueueFull`]. [`UplinkClient::try_send`] never waits.
//!
//! # Events
//!
//! The [`EventStream`] yields zero or more [`UplinkEvent::Data`] events
//! followed by exactly one terminal event: [`UplinkEvent::Disconnected`]
//! when the link fails or the peer hangs up,
//! [`UplinkEvent::ShutdownRequested`] when the shutdown was local. The
//! stream also implements [`futures_util::Stream`] for combinator-style
//! consumption. Dropping it does not close the link; received bytes are
//! simply discarded.
//!
//! # Shutdown
//!
//! [`UplinkClient::shutdown`] asks the multiplexer to stop after
//! forwarding everything already queued. [`UplinkClient::close`] does that
//! and then waits for the task to exit, so the socket is released by the
//! time it returns; calling it again, or after the link already went down
//! by itself, succeeds immediately.

mod client;
mod config;
mod connect;
mod error;
mod event;
mod mux;
mod queue;
mod state;

pub use client::UplinkClient;
pub use config::{DEFAULT_HANDSHAKE, QueueConfig, SocketConfig, UplinkConfig};
pub use error::{CloseError, ConnectError, SendError};
pub use event::{DisconnectReason, EventStream, UplinkEvent};
pub use queue::OverflowPolicy;
pub use state::LinkState;
