//! WebSocket client with automatic reconnection

use super::types::{WsConfig, WsError, WsEvent};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Why a single connection session ended
enum SessionEnd {
    /// The event receiver or the outbound sender was dropped; stop for good
    ChannelClosed,
    /// Read error, send error or close frame; reconnect
    ConnectionLost(String),
}

/// Reusable WebSocket client
pub struct WsClient {
    config: WsConfig,
}

impl WsClient {
    /// Create a new client with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Connect and return the event receiver plus an outbound text sender.
    ///
    /// Spawns a background task that owns the connection: it reconnects with
    /// exponential backoff after any failure (including a server-side close)
    /// and emits [`WsEvent::Connected`] after every successful connect so the
    /// consumer can re-issue its subscriptions.
    pub fn connect(&self) -> (mpsc::Receiver<WsEvent>, mpsc::Sender<String>) {
        let (event_tx, event_rx) = mpsc::channel(1024);
        let (out_tx, out_rx) = mpsc::channel(256);
        let config = self.config.clone();

        tokio::spawn(async move {
            if let Err(e) = Self::run(config, event_tx, out_rx).await {
                tracing::error!(error = %e, "websocket connection loop failed");
            }
        });

        (event_rx, out_tx)
    }

    /// Connection loop: connect, stream, back off, repeat
    async fn run(
        config: WsConfig,
        event_tx: mpsc::Sender<WsEvent>,
        mut out_rx: mpsc::Receiver<String>,
    ) -> Result<(), WsError> {
        let mut attempts: u32 = 0;
        let mut delay = config.initial_reconnect_delay;

        loop {
            match connect_async(&config.url).await {
                Ok((stream, _response)) => {
                    tracing::info!(url = %config.url, "websocket connected");
                    attempts = 0;
                    delay = config.initial_reconnect_delay;

                    if event_tx.send(WsEvent::Connected).await.is_err() {
                        return Ok(());
                    }

                    match Self::stream_session(stream, &config, &event_tx, &mut out_rx).await {
                        SessionEnd::ChannelClosed => {
                            tracing::debug!("consumer gone, closing websocket");
                            return Ok(());
                        }
                        SessionEnd::ConnectionLost(reason) => {
                            tracing::warn!(reason = %reason, "websocket connection lost");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(url = %config.url, error = %e, "websocket connect failed");
                }
            }

            attempts += 1;
            if config.max_reconnect_attempts > 0 && attempts >= config.max_reconnect_attempts {
                tracing::error!("maximum websocket reconnection attempts reached");
                let _ = event_tx.send(WsEvent::Disconnected).await;
                return Err(WsError::MaxReconnectsExceeded);
            }

            if event_tx.is_closed() {
                return Ok(());
            }
            let _ = event_tx
                .send(WsEvent::Reconnecting { attempt: attempts })
                .await;

            sleep(delay).await;
            delay = (delay * 2).min(config.max_reconnect_delay);
        }
    }

    /// Pump one established connection until it ends
    async fn stream_session(
        stream: WsStream,
        config: &WsConfig,
        event_tx: &mpsc::Sender<WsEvent>,
        out_rx: &mut mpsc::Receiver<String>,
    ) -> SessionEnd {
        let (mut write, mut read) = stream.split();

        let mut ping_interval = tokio::time::interval(config.ping_interval);
        ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // First tick fires immediately; consume it so we don't ping at connect
        ping_interval.tick().await;
        let mut waiting_for_pong = false;

        loop {
            tokio::select! {
                inbound = read.next() => {
                    match inbound {
                        Some(Ok(Message::Text(text))) => {
                            if event_tx.send(WsEvent::Text(text)).await.is_err() {
                                return SessionEnd::ChannelClosed;
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = write.send(Message::Pong(data)).await {
                                return SessionEnd::ConnectionLost(e.to_string());
                            }
                        }
                        Some(Ok(Message::Pong(_))) => {
                            waiting_for_pong = false;
                        }
                        Some(Ok(Message::Close(_))) => {
                            return SessionEnd::ConnectionLost("close frame".to_string());
                        }
                        Some(Err(e)) => {
                            return SessionEnd::ConnectionLost(e.to_string());
                        }
                        None => {
                            return SessionEnd::ConnectionLost("stream ended".to_string());
                        }
                        _ => {}
                    }
                }

                outbound = out_rx.recv() => {
                    match outbound {
                        Some(text) => {
                            if let Err(e) = write.send(Message::Text(text)).await {
                                return SessionEnd::ConnectionLost(e.to_string());
                            }
                        }
                        None => return SessionEnd::ChannelClosed,
                    }
                }

                _ = ping_interval.tick() => {
                    if waiting_for_pong {
                        return SessionEnd::ConnectionLost("pong timeout".to_string());
                    }
                    if let Err(e) = write.send(Message::Ping(vec![])).await {
                        return SessionEnd::ConnectionLost(e.to_string());
                    }
                    waiting_for_pong = true;
                }
            }
        }
    }
}
