//! WebSocket types and configuration

use super::backoff::BackoffPolicy;
use std::time::Duration;

/// WebSocket client configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket URL to connect to
    pub url: String,
    /// Maximum consecutive failures before giving up (0 = infinite)
    pub max_reconnect_attempts: u32,
    /// Delay schedule between reconnection attempts
    pub backoff: BackoffPolicy,
    /// Interval for sending ping frames (None disables keepalive)
    pub ping_interval: Option<Duration>,
    /// Buffer size of the message channel handed to the caller
    pub buffer_size: usize,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_reconnect_attempts: 0,
            backoff: BackoffPolicy::default(),
            ping_interval: Some(Duration::from_secs(30)),
            buffer_size: 1024,
        }
    }
}

impl WsConfig {
    /// Create a new config with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set maximum consecutive failures (0 = retry forever)
    pub fn max_reconnects(mut self, n: u32) -> Self {
        self.max_reconnect_attempts = n;
        self
    }

    /// Set the reconnection backoff policy
    pub fn backoff(mut self, policy: BackoffPolicy) -> Self {
        self.backoff = policy;
        self
    }

    /// Set ping interval
    pub fn ping_interval(mut self, d: Duration) -> Self {
        self.ping_interval = Some(d);
        self
    }

    /// Disable client keepalive pings
    pub fn without_ping(mut self) -> Self {
        self.ping_interval = None;
        self
    }
}

/// Events emitted by [`WsClient`](super::WsClient) to its consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    /// Text message
    Text(String),
    /// Binary message
    Binary(Vec<u8>),
    /// A connection attempt is starting
    Connecting,
    /// Connection established
    Connected,
    /// The socket was lost or could not be opened
    Disconnected { reason: String },
    /// A reconnect is scheduled after `delay`
    Reconnecting { attempt: u32, delay: Duration },
}

/// WebSocket errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WsError {
    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// Send failed
    #[error("Send failed: {0}")]
    SendFailed(String),
    /// Peer sent a close frame
    #[error("Connection closed by peer")]
    Closed,
    /// Stream ended without a close frame
    #[error("Stream ended unexpectedly")]
    StreamEnded,
    /// No pong arrived within one ping interval
    #[error("Pong timeout")]
    PongTimeout,
    /// Maximum reconnection attempts exceeded
    #[error("Maximum reconnection attempts exceeded")]
    MaxReconnectsExceeded,
}
