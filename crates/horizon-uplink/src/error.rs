//! Error types for the uplink client.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors that can occur while establishing an uplink.
///
/// Any of these means the link never came up; everything acquired before
/// the failing step has already been released when the error is returned.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Hostname resolution failed.
    #[error("failed to resolve '{host}': {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },

    /// The hostname resolved, but to no usable addresses.
    #[error("'{host}' resolved to no addresses")]
    NoAddresses { host: String },

    /// The TCP connection attempt failed.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// The connection attempt did not complete within the configured timeout.
    #[error("connecting to {addr} timed out")]
    Timeout { addr: SocketAddr },
}

/// Errors that can occur while enqueueing onto the write queue.
#[derive(Debug, Error)]
pub enum SendError {
    /// The multiplexer is no longer draining the queue.
    #[error("uplink closed")]
    Closed,

    /// The queue is at capacity and the overflow policy rejects new entries.
    #[error("write queue full")]
    QueueFull,
}

/// Errors that can occur while closing an uplink.
#[derive(Debug, Error)]
pub enum CloseError {
    /// The multiplexer task terminated abnormally.
    #[error("multiplexer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
