//! Shared price store
//!
//! The single source of truth written by the streaming feeds and the baseline
//! refresher and read by the query layer. Two independent maps, each behind
//! its own reader/writer lock so that snapshot readers never block each other
//! and a writer holds a lock only for one entry assignment.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Most recent streamed price for one symbol
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestPrice {
    pub price: Decimal,
    /// When the last tick was applied; None until the first tick arrives
    pub updated_at: Option<DateTime<Utc>>,
}

/// Reference price for one symbol, captured by the baseline refresher
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselinePrice {
    pub price: Decimal,
    /// When the baseline was captured; None until the first successful poll
    pub captured_at: Option<DateTime<Utc>>,
}

/// Concurrency-safe container for the latest and baseline price maps.
///
/// Cloning is cheap and shares the underlying state. Locks are never held
/// across I/O; callers get either the state before or after any single write,
/// never a torn entry.
#[derive(Clone)]
pub struct PriceStore {
    latest: Arc<RwLock<HashMap<String, LatestPrice>>>,
    baseline: Arc<RwLock<HashMap<String, BaselinePrice>>>,
}

impl PriceStore {
    /// Create a store with every tracked symbol present at zero/unknown values
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut latest = HashMap::new();
        let mut baseline = HashMap::new();
        for symbol in symbols {
            let symbol = symbol.into();
            latest.insert(symbol.clone(), LatestPrice::default());
            baseline.insert(symbol, BaselinePrice::default());
        }

        Self {
            latest: Arc::new(RwLock::new(latest)),
            baseline: Arc::new(RwLock::new(baseline)),
        }
    }

    /// Atomically replace one symbol's latest price. Last write wins.
    pub async fn set_latest(&self, symbol: &str, price: Decimal) {
        let entry = LatestPrice {
            price,
            updated_at: Some(Utc::now()),
        };
        let mut guard = self.latest.write().await;
        guard.insert(symbol.to_string(), entry);
    }

    /// Atomically replace one symbol's baseline price.
    pub async fn set_baseline(&self, symbol: &str, price: Decimal, captured_at: DateTime<Utc>) {
        let entry = BaselinePrice {
            price,
            captured_at: Some(captured_at),
        };
        let mut guard = self.baseline.write().await;
        guard.insert(symbol.to_string(), entry);
    }

    /// Point-in-time copy of the latest price map
    pub async fn all_latest(&self) -> HashMap<String, LatestPrice> {
        self.latest.read().await.clone()
    }

    /// Point-in-time copy of the baseline price map
    pub async fn all_baseline(&self) -> HashMap<String, BaselinePrice> {
        self.baseline.read().await.clone()
    }

    /// Latest price for one symbol, if tracked
    pub async fn latest(&self, symbol: &str) -> Option<LatestPrice> {
        self.latest.read().await.get(symbol).cloned()
    }

    /// Baseline price for one symbol, if tracked
    pub async fn baseline(&self, symbol: &str) -> Option<BaselinePrice> {
        self.baseline.read().await.get(symbol).cloned()
    }
}
