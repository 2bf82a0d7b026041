//! Bybit v5 REST reference-price source
//!
//! Supports the two request/response representations the baseline can be
//! configured with: a kline window from ~24h ago (close price at index 4 of
//! the last row) and the ticker list's previous-24h price field.

use super::BaselineSource;
use crate::config::{BaselineConfig, BaselineKind};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Kline close price column index in a Bybit v5 kline row
const KLINE_CLOSE_INDEX: usize = 4;

#[derive(Debug, Deserialize)]
struct KlineResponse {
    #[serde(default)]
    result: KlineResult,
}

#[derive(Debug, Default, Deserialize)]
struct KlineResult {
    #[serde(default)]
    list: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TickersResponse {
    #[serde(default)]
    result: TickersResult,
}

#[derive(Debug, Default, Deserialize)]
struct TickersResult {
    #[serde(default)]
    list: Vec<TickerRow>,
}

#[derive(Debug, Deserialize)]
struct TickerRow {
    #[serde(rename = "prevPrice24h", default)]
    prev_price_24h: Option<String>,
}

/// REST client for Bybit v5 spot market endpoints
pub struct BybitRest {
    base_url: String,
    kind: BaselineKind,
    client: Client,
}

impl BybitRest {
    /// Build a client with the configured base URL, semantics and timeout
    pub fn new(config: &BaselineConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.rest_url.clone(),
            kind: config.semantics,
            client,
        })
    }

    /// One-minute kline close from ~24h ago
    async fn fetch_kline_close(&self, ticker: &str) -> anyhow::Result<Decimal> {
        let end = Utc::now() - ChronoDuration::hours(24);
        let start = end - ChronoDuration::minutes(1);
        let url = format!("{}/v5/market/kline", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("category", "spot"),
                ("symbol", ticker),
                ("interval", "1"),
                ("start", &start.timestamp_millis().to_string()),
                ("end", &end.timestamp_millis().to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("bybit kline returned status {}", response.status());
        }

        Self::close_from_kline(response.json().await?)
    }

    /// Previous-24h price from the spot ticker list
    async fn fetch_prev_24h(&self, ticker: &str) -> anyhow::Result<Decimal> {
        let url = format!("{}/v5/market/tickers", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("category", "spot"), ("symbol", ticker)])
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("bybit tickers returned status {}", response.status());
        }

        Self::prev_from_tickers(response.json().await?)
    }

    fn close_from_kline(response: KlineResponse) -> anyhow::Result<Decimal> {
        let row = response
            .result
            .list
            .last()
            .ok_or_else(|| anyhow::anyhow!("no kline data"))?;
        let close = row
            .get(KLINE_CLOSE_INDEX)
            .ok_or_else(|| anyhow::anyhow!("kline row too short"))?;
        Decimal::from_str(close).map_err(|e| anyhow::anyhow!("bad kline close {:?}: {}", close, e))
    }

    fn prev_from_tickers(response: TickersResponse) -> anyhow::Result<Decimal> {
        let row = response
            .result
            .list
            .first()
            .ok_or_else(|| anyhow::anyhow!("no ticker data"))?;
        let prev = row
            .prev_price_24h
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("ticker missing prevPrice24h"))?;
        Decimal::from_str(prev).map_err(|e| anyhow::anyhow!("bad prevPrice24h {:?}: {}", prev, e))
    }
}

#[async_trait]
impl BaselineSource for BybitRest {
    async fn fetch(&self, ticker: &str) -> anyhow::Result<Decimal> {
        match self.kind {
            BaselineKind::PointInTime => self.fetch_kline_close(ticker).await,
            BaselineKind::Prev24h => self.fetch_prev_24h(ticker).await,
            // Re-anchoring reads the store, not the exchange; the refresher
            // never routes it here
            BaselineKind::Reanchor => {
                anyhow::bail!("reanchor baseline has no REST source")
            }
        }
    }
}
