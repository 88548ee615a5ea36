//! The local write queue between producers and the multiplexer task.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::config::QueueConfig;
use crate::error::SendError;

/// Command dequeued by the multiplexer task.
#[derive(Debug)]
pub(crate) enum WriteCommand {
    /// Payload to forward to the socket verbatim.
    Data(Vec<u8>),
    /// Stop the multiplexer once every earlier command has been serviced.
    Shutdown,
}

/// What `send` does when the write queue is at capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Wait until a slot frees up.
    Block,
    /// Fail immediately with [`SendError::QueueFull`](crate::SendError::QueueFull).
    Reject,
}

impl Default for OverflowPolicy {
    fn default() -> Self {
        Self::Block
    }
}

/// Producer side of the write queue.
///
/// Commands are delivered to the multiplexer in enqueue order. Once the
/// multiplexer exits it drops the consumer side and every enqueue attempt
/// fails with [`SendError::Closed`].
#[derive(Clone)]
pub(crate) struct SendQueue {
    tx: mpsc::Sender<WriteCommand>,
    overflow: OverflowPolicy,
}

impl SendQueue {
    /// Create the queue, returning the producer side and the consumer end.
    ///
    /// A capacity of zero is treated as one.
    pub(crate) fn channel(config: &QueueConfig) -> (Self, mpsc::Receiver<WriteCommand>) {
        // tokio panics on a zero-capacity channel
        let (tx, rx) = mpsc::channel(config.capacity.max(1));
        let queue = Self {
            tx,
            overflow: config.overflow,
        };
        (queue, rx)
    }

    /// Enqueue a payload, honoring the overflow policy.
    pub(crate) async fn push(&self, payload: Vec<u8>) -> Result<(), SendError> {
        match self.overflow {
            OverflowPolicy::Block => self
                .tx
                .send(WriteCommand::Data(payload))
                .await
                .map_err(|_| SendError::Closed),
            OverflowPolicy::Reject => self.try_push(payload),
        }
    }

    /// Enqueue a payload without waiting, regardless of policy.
    pub(crate) fn try_push(&self, payload: Vec<u8>) -> Result<(), SendError> {
        self.tx
            .try_send(WriteCommand::Data(payload))
            .map_err(|e| match e {
                TrySendError::Full(_) => SendError::QueueFull,
                TrySendError::Closed(_) => SendError::Closed,
            })
    }

    /// Enqueue a shutdown request, waiting for capacity regardless of policy.
    ///
    /// Waiting here means a full queue delays the request instead of
    /// dropping it; everything enqueued earlier is still forwarded first.
    pub(crate) async fn push_shutdown(&self) -> Result<(), SendError> {
        self.tx
            .send(WriteCommand::Shutdown)
            .await
            .map_err(|_| SendError::Closed)
    }
}
