//! WebSocket types and configuration

use futures_util::stream::BoxStream;
use std::time::Duration;

/// WebSocket client configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket URL to connect to
    pub url: String,
    /// Delay before the first reconnection attempt after a close
    pub reconnect_delay: Duration,
    /// Maximum reconnection attempts before giving up (0 = infinite)
    pub max_reconnect_attempts: u32,
    /// Growth factor applied to the delay per consecutive attempt (1.0 = fixed delay)
    pub backoff_multiplier: f64,
    /// Upper bound for the reconnection delay
    pub max_reconnect_delay: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            reconnect_delay: Duration::from_secs(5),
            max_reconnect_attempts: 0,
            backoff_multiplier: 1.0,
            max_reconnect_delay: Duration::from_secs(60),
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

    /// Set maximum reconnection attempts
    pub fn max_reconnects(mut self, n: u32) -> Self {
        self.max_reconnect_attempts = n;
        self
    }

    /// Set the base reconnection delay
    pub fn reconnect_delay(mut self, d: Duration) -> Self {
        self.reconnect_delay = d;
        self
    }

    /// Enable exponential backoff with the given multiplier
    pub fn backoff(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Set maximum reconnection delay
    pub fn max_delay(mut self, d: Duration) -> Self {
        self.max_reconnect_delay = d;
        self
    }

    /// Delay to wait before reconnection attempt number `attempt` (1-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let multiplier = self.backoff_multiplier.max(1.0);
        if multiplier == 1.0 {
            return self.reconnect_delay;
        }

        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.reconnect_delay.as_secs_f64() * multiplier.powi(exponent);
        Duration::try_from_secs_f64(secs)
            .unwrap_or(self.max_reconnect_delay)
            .min(self.max_reconnect_delay)
    }

    /// Whether another reconnection attempt is allowed
    pub fn allows_attempt(&self, attempt: u32) -> bool {
        self.max_reconnect_attempts == 0 || attempt <= self.max_reconnect_attempts
    }
}

/// Raw event produced by an open transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Text frame
    Text(String),
    /// Abnormal condition; the stream is expected to end or close next
    Error(String),
    /// Close frame received from the peer
    Closed { code: Option<u16>, reason: String },
}

/// Stream of events from one open transport. Dropping it closes the transport.
pub type TransportStream = BoxStream<'static, TransportEvent>;

/// Events emitted by [`WsClient`](super::WsClient) to its consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    /// Text message
    Text(String),
    /// Connection established
    Connected,
    /// Transport reported an error; a `Disconnected` follows
    Error(String),
    /// The connection could not be constructed at all; no retry is scheduled
    ConnectFailed(String),
    /// Connection closed
    Disconnected { code: Option<u16>, reason: String },
    /// Reconnection scheduled after `delay`
    Reconnecting { attempt: u32, delay: Duration },
}

/// WebSocket errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WsError {
    /// URL could not be turned into a handshake request
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// Channel closed
    #[error("Channel closed")]
    ChannelClosed,
}
