//! Configuration types for the uplink client.

use std::time::Duration;

use crate::queue::OverflowPolicy;

/// Payload transmitted once, right after the socket connects.
pub const DEFAULT_HANDSHAKE: &[u8] = b"socket create succeed";

/// Socket-level options for the uplink connection.
#[derive(Clone, Debug)]
pub struct SocketConfig {
    /// Enable TCP_NODELAY (disable Nagle's algorithm).
    pub no_delay: bool,
    /// Read buffer size in bytes. One socket read fills at most this much.
    /// Zero is treated as one.
    pub read_buffer_size: usize,
    /// Connection timeout. `None` waits indefinitely.
    pub connect_timeout: Option<Duration>,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            no_delay: false,
            read_buffer_size: 8192,
            connect_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl SocketConfig {
    /// Create a new socket configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable TCP_NODELAY.
    pub fn no_delay(mut self, enabled: bool) -> Self {
        self.no_delay = enabled;
        self
    }

    /// Set the read buffer size.
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Disable connection timeout.
    pub fn no_connect_timeout(mut self) -> Self {
        self.connect_timeout = None;
        self
    }
}

/// Options for the local write queue.
#[derive(Clone, Debug)]
pub struct QueueConfig {
    /// Queue depth in commands. Zero is treated as one.
    pub capacity: usize,
    /// What `send` does when the queue is at capacity.
    pub overflow: OverflowPolicy,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            overflow: OverflowPolicy::Block,
        }
    }
}

impl QueueConfig {
    /// Create a new queue configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the queue depth.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Make `send` wait for a free slot when the queue is full.
    pub fn block_when_full(mut self) -> Self {
        self.overflow = OverflowPolicy::Block;
        self
    }

    /// Make `send` fail immediately when the queue is full.
    pub fn reject_when_full(mut self) -> Self {
        self.overflow = OverflowPolicy::Reject;
        self
    }
}

/// Configuration for an uplink connection.
#[derive(Clone, Debug)]
pub struct UplinkConfig {
    /// The host to connect to.
    pub host: String,
    /// The port to connect to.
    pub port: u16,
    /// Socket-level options.
    pub socket: SocketConfig,
    /// Write queue options.
    pub queue: QueueConfig,
    /// Payload sent once after connecting. `None` sends nothing.
    pub handshake: Option<Vec<u8>>,
    /// Event channel depth between the multiplexer and the event stream.
    /// Zero is treated as one.
    pub event_capacity: usize,
}

impl UplinkConfig {
    /// Create a new uplink configuration.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            socket: SocketConfig::default(),
            queue: QueueConfig::default(),
            handshake: Some(DEFAULT_HANDSHAKE.to_vec()),
            event_capacity: 64,
        }
    }

    /// Set socket options.
    pub fn socket_config(mut self, config: SocketConfig) -> Self {
        self.socket = config;
        self
    }

    /// Set write queue options.
    pub fn queue_config(mut self, config: QueueConfig) -> Self {
        self.queue = config;
        self
    }

    /// Enable TCP_NODELAY.
    pub fn no_delay(mut self, enabled: bool) -> Self {
        self.socket.no_delay = enabled;
        self
    }

    /// Set connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.socket.connect_timeout = Some(timeout);
        self
    }

    /// Set the read buffer size.
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.socket.read_buffer_size = size;
        self
    }

    /// Set the write queue depth.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue.capacity = capacity;
        self
    }

    /// Make `send` fail immediately when the write queue is full.
    pub fn reject_when_full(mut self) -> Self {
        self.queue.overflow = OverflowPolicy::Reject;
        self
    }

    /// Set the event channel depth.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Set the handshake payload sent after connecting.
    pub fn handshake(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.handshake = Some(payload.into());
        self
    }

    /// Send nothing after connecting.
    pub fn no_handshake(mut self) -> Self {
        self.handshake = None;
        self
    }

    /// Get the address string (host:port).
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_config_builder() {
        let config = SocketConfig::new()
            .no_delay(true)
            .read_buffer_size(16384)
            .connect_timeout(Duration::from_secs(10));

        assert!(config.no_delay);
        assert_eq!(config.read_buffer_size, 16384);
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(10)));

        let config = config.no_connect_timeout();
        assert_eq!(config.connect_timeout, None);
    }

    #[test]
    fn test_queue_config_builder() {
        let config = QueueConfig::new().capacity(8).reject_when_full();

        assert_eq!(config.capacity, 8);
        assert_eq!(config.overflow, OverflowPolicy::Reject);

        let config = config.block_when_full();
        assert_eq!(config.overflow, OverflowPolicy::Block);
    }

    #[test]
    fn test_uplink_config_defaults() {
        let config = UplinkConfig::new("localhost", 9000);

        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 9000);
        assert_eq!(config.address(), "localhost:9000");
        assert_eq!(config.handshake.as_deref(), Some(DEFAULT_HANDSHAKE));
        assert_eq!(config.queue.capacity, 64);
        assert_eq!(config.event_capacity, 64);
        assert_eq!(config.socket.read_buffer_size, 8192);
    }

    #[test]
    fn test_uplink_config_builder() {
        let config = UplinkConfig::new("127.0.0.1", 7000)
            .no_delay(true)
            .connect_timeout(Duration::from_secs(5))
            .read_buffer_size(1024)
            .queue_capacity(16)
            .reject_when_full()
            .event_capacity(8)
            .handshake(b"hello".to_vec());

        assert!(config.socket.no_delay);
        assert_eq!(config.socket.connect_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.socket.read_buffer_size, 1024);
        assert_eq!(config.queue.capacity, 16);
        assert_eq!(config.queue.overflow, OverflowPolicy::Reject);
        assert_eq!(config.event_capacity, 8);
        assert_eq!(config.handshake.as_deref(), Some(&b"hello"[..]));
    }

    #[test]
    fn test_uplink_config_no_handshake() {
        let config = UplinkConfig::new("127.0.0.1", 7000).no_handshake();
        assert!(config.handshake.is_none());
    }
}
