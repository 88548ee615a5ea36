//! State enum for the uplink handle.

/// Current state of an uplink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    /// The multiplexer task is running and the socket is live.
    Connected,
    /// A close is in progress; the multiplexer is draining the queue.
    Closing,
    /// The multiplexer task has exited and the socket is released.
    Closed,
}

impl Default for LinkState {
    fn default() -> Self {
        Self::Closed
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected => write!(f, "Connected"),
            Self::Closing => write!(f, "Closing"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(LinkState::Connected.to_string(), "Connected");
        assert_eq!(LinkState::Closing.to_string(), "Closing");
        assert_eq!(LinkState::Closed.to_string(), "Closed");
    }

    #[test]
    fn test_state_default() {
        assert_eq!(LinkState::default(), LinkState::Closed);
    }
}
