//! Configuration types for coinwatch

use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Tracked symbols; defaults to BTC/ETH/SOL against USDC
    #[serde(default = "default_symbols")]
    pub symbols: Vec<SymbolConfig>,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub baseline: BaselineConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// One tracked asset pair
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolConfig {
    /// Short asset id, used as the key in all snapshots (e.g. "BTC")
    pub id: String,
    /// Display name (e.g. "Bitcoin")
    pub name: String,
    /// Exchange pair symbol (e.g. "BTCUSDC")
    pub ticker: String,
}

impl SymbolConfig {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        ticker: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ticker: ticker.into(),
        }
    }
}

fn default_symbols() -> Vec<SymbolConfig> {
    vec![
        SymbolConfig::new("BTC", "Bitcoin", "BTCUSDC"),
        SymbolConfig::new("ETH", "Ethereum", "ETHUSDC"),
        SymbolConfig::new("SOL", "Solana", "SOLUSDC"),
    ]
}

/// Streaming feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Websocket endpoint for the public spot stream
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Initial reconnect delay in seconds
    #[serde(default = "default_initial_reconnect_secs")]
    pub initial_reconnect_secs: u64,
    /// Cap on the reconnect delay in seconds
    #[serde(default = "default_max_reconnect_secs")]
    pub max_reconnect_secs: u64,
}

fn default_ws_url() -> String {
    "wss://stream.bybit.com/v5/public/spot".to_string()
}
fn default_initial_reconnect_secs() -> u64 {
    1
}
fn default_max_reconnect_secs() -> u64 {
    60
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            initial_reconnect_secs: 1,
            max_reconnect_secs: 60,
        }
    }
}

/// Baseline refresher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BaselineConfig {
    /// REST endpoint base URL
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    /// Seconds between refresh cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Which reference price the baseline represents
    #[serde(default)]
    pub semantics: BaselineKind,
    /// Directory for durable per-symbol baseline records; None disables persistence
    #[serde(default)]
    pub persist_dir: Option<PathBuf>,
}

fn default_rest_url() -> String {
    "https://api.bybit.com".to_string()
}
fn default_interval_secs() -> u64 {
    600
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            rest_url: default_rest_url(),
            interval_secs: 600,
            timeout_secs: 10,
            semantics: BaselineKind::default(),
            persist_dir: None,
        }
    }
}

/// Baseline semantics: which reference price the refresher captures
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
pub enum BaselineKind {
    /// One-minute kline close from ~24h ago
    #[default]
    #[serde(rename = "point-in-time")]
    PointInTime,
    /// Exchange-reported previous-24h price
    #[serde(rename = "prev-24h")]
    Prev24h,
    /// Re-anchor from the current streaming price, no network call
    #[serde(rename = "reanchor")]
    Reanchor,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Prometheus scrape port; None disables the exporter
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            feed: FeedConfig::default(),
            baseline: BaselineConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}
