//! WebSocket client configuration, events and errors

use std::time::Duration;

/// WebSocket client configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Endpoint to connect to
    pub url: String,
    /// Maximum consecutive reconnection attempts before giving up (0 = infinite)
    pub max_reconnect_attempts: u32,
    /// Delay before the first reconnection attempt
    pub initial_reconnect_delay: Duration,
    /// Cap on the reconnection delay
    pub max_reconnect_delay: Duration,
    /// Interval between ping frames
    pub ping_interval: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_reconnect_attempts: 0,
            initial_reconnect_delay: Duration::from_secs(1),
            max_reconnect_delay: Duration::from_secs(60),
            ping_interval: Duration::from_secs(30),
        }
    }
}

impl WsConfig {
    /// Create a new config for the given endpoint
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set maximum consecutive reconnection attempts (0 = infinite)
    pub fn max_reconnects(mut self, n: u32) -> Self {
        self.max_reconnect_attempts = n;
        self
    }

    /// Set the initial reconnection delay
    pub fn initial_delay(mut self, d: Duration) -> Self {
        self.initial_reconnect_delay = d;
        self
    }

    /// Set the reconnection delay cap
    pub fn max_delay(mut self, d: Duration) -> Self {
        self.max_reconnect_delay = d;
        self
    }

    /// Set the ping interval
    pub fn ping_interval(mut self, d: Duration) -> Self {
        self.ping_interval = d;
        self
    }
}

/// Events delivered to the consumer of a [`super::WsClient`]
#[derive(Debug, Clone)]
pub enum WsEvent {
    /// A text frame arrived
    Text(String),
    /// Connection established; subscriptions must be (re)issued now
    Connected,
    /// The client gave up reconnecting
    Disconnected,
    /// Connection lost, retrying
    Reconnecting { attempt: u32 },
}

/// WebSocket transport errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum WsError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("maximum reconnection attempts exceeded")]
    MaxReconnectsExceeded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_config_default() {
        let config = WsConfig::default();
        assert_eq!(config.max_reconnect_attempts, 0);
        assert_eq!(config.initial_reconnect_delay, Duration::from_secs(1));
        assert_eq!(config.max_reconnect_delay, Duration::from_secs(60));
        assert_eq!(config.ping_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_ws_config_builder() {
        let config = WsConfig::new("wss://example.com")
            .max_reconnects(5)
            .initial_delay(Duration::from_millis(500))
            .max_delay(Duration::from_secs(30))
            .ping_interval(Duration::from_secs(15));

        assert_eq!(config.url, "wss://example.com");
        assert_eq!(config.max_reconnect_attempts, 5);
        assert_eq!(config.initial_reconnect_delay, Duration::from_millis(500));
        assert_eq!(config.max_reconnect_delay, Duration::from_secs(30));
        assert_eq!(config.ping_interval, Duration::from_secs(15));
    }

    #[test]
    fn test_ws_error_display() {
        let err = WsError::ConnectionFailed("timeout".to_string());
        assert_eq!(err.to_string(), "connection failed: timeout");
        assert_eq!(
            WsError::MaxReconnectsExceeded.to_string(),
            "maximum reconnection attempts exceeded"
        );
    }

    #[test]
    fn test_ws_event_variants() {
        assert!(matches!(
            WsEvent::Text("hi".to_string()),
            WsEvent::Text(_)
        ));
        assert!(matches!(
            WsEvent::Reconnecting { attempt: 2 },
            WsEvent::Reconnecting { attempt: 2 }
        ));
    }
}
