//! Feed types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single price update from the streaming feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTick {
    /// Symbol id the tick belongs to (e.g. "BTC")
    pub symbol: String,
    /// Last traded price
    pub price: Decimal,
    /// Local timestamp when the tick was received
    pub timestamp: DateTime<Utc>,
}
