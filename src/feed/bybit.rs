//! Bybit public spot ticker feed
//!
//! Subscribes to `tickers.<SYMBOL>` on the v5 public spot stream and turns
//! ticker envelopes into [`PriceTick`]s. Messages without a last-traded price
//! (subscription acks, heartbeats, partial ticker updates) are ignored.

use super::{PriceFeed, PriceTick};
use crate::config::{FeedConfig, SymbolConfig};
use crate::ws::{WsClient, WsConfig, WsEvent};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::mpsc;

/// Inbound ticker envelope; unknown message shapes deserialize with all
/// fields absent and are discarded
#[derive(Debug, Deserialize)]
struct TickerEnvelope {
    #[serde(default)]
    #[allow(dead_code)]
    topic: Option<String>,
    #[serde(default)]
    data: Option<TickerData>,
}

#[derive(Debug, Deserialize)]
struct TickerData {
    #[serde(rename = "lastPrice", default)]
    last_price: Option<String>,
}

/// Streaming feed for one symbol on Bybit spot
pub struct BybitFeed {
    symbol: String,
    topic: String,
    ws_url: String,
    initial_reconnect: Duration,
    max_reconnect: Duration,
}

impl BybitFeed {
    /// Create a feed for one configured symbol
    pub fn new(symbol: &SymbolConfig, feed: &FeedConfig) -> Self {
        Self {
            symbol: symbol.id.clone(),
            topic: format!("tickers.{}", symbol.ticker),
            ws_url: feed.ws_url.clone(),
            initial_reconnect: Duration::from_secs(feed.initial_reconnect_secs),
            max_reconnect: Duration::from_secs(feed.max_reconnect_secs),
        }
    }

    /// Subscription request for this feed's ticker topic
    fn subscribe_payload(&self) -> String {
        serde_json::json!({ "op": "subscribe", "args": [self.topic] }).to_string()
    }

    /// Extract the last traded price from one inbound message.
    ///
    /// Returns None for anything that is not a ticker update carrying a
    /// non-empty `lastPrice`; malformed payloads are never an error.
    fn parse_message(msg: &str) -> Option<Decimal> {
        let envelope: TickerEnvelope = serde_json::from_str(msg).ok()?;
        let last_price = envelope.data?.last_price?;
        if last_price.is_empty() {
            return None;
        }
        Decimal::from_str(&last_price).ok()
    }

    /// Pump websocket events into ticks
    async fn run_message_loop(
        symbol: String,
        subscribe_payload: String,
        mut ws_rx: mpsc::Receiver<WsEvent>,
        ws_tx: mpsc::Sender<String>,
        tick_tx: mpsc::Sender<PriceTick>,
    ) {
        while let Some(event) = ws_rx.recv().await {
            match event {
                WsEvent::Text(text) => {
                    if let Some(price) = Self::parse_message(&text) {
                        let tick = PriceTick {
                            symbol: symbol.clone(),
                            price,
                            timestamp: Utc::now(),
                        };
                        if tick_tx.send(tick).await.is_err() {
                            tracing::debug!(symbol = %symbol, "tick receiver dropped, stopping feed");
                            break;
                        }
                    }
                }
                WsEvent::Connected => {
                    // Fire-and-forget: the receive loop starts without waiting
                    // for the subscription ack
                    if ws_tx.send(subscribe_payload.clone()).await.is_err() {
                        break;
                    }
                    tracing::info!(symbol = %symbol, "subscribed to ticker stream");
                }
                WsEvent::Reconnecting { attempt } => {
                    tracing::warn!(symbol = %symbol, attempt, "ticker stream reconnecting");
                }
                WsEvent::Disconnected => {
                    tracing::warn!(symbol = %symbol, "ticker stream disconnected");
                    break;
                }
            }
        }
    }
}

#[async_trait]
impl PriceFeed for BybitFeed {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<PriceTick>> {
        let (tick_tx, tick_rx) = mpsc::channel(1024);

        tracing::info!(symbol = %self.symbol, topic = %self.topic, "opening ticker stream");

        let config = WsConfig::new(&self.ws_url)
            .max_reconnects(0)
            .initial_delay(self.initial_reconnect)
            .max_delay(self.max_reconnect);

        let client = WsClient::new(config);
        let (ws_rx, ws_tx) = client.connect();

        let symbol = self.symbol.clone();
        let payload = self.subscribe_payload();
        tokio::spawn(async move {
            Self::run_message_loop(symbol, payload, ws_rx, ws_tx, tick_tx).await;
        });

        Ok(tick_rx)
    }
}
