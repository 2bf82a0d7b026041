//! Read-only query surface
//!
//! What the serving layer consumes: the static symbol catalog and
//! point-in-time snapshots of the two price maps. Snapshots are always
//! well-formed; symbols not yet resolved appear with zero/unknown values.
//! No mutation entry points are exposed here.

use crate::config::SymbolConfig;
use crate::store::{BaselinePrice, LatestPrice, PriceStore};
use serde::Serialize;
use std::collections::HashMap;

/// Catalog entry for one tracked asset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coin {
    pub id: String,
    pub name: String,
}

/// Read accessors over the shared price store
pub struct QueryService {
    store: PriceStore,
    coins: Vec<Coin>,
}

impl QueryService {
    pub fn new(store: PriceStore, symbols: &[SymbolConfig]) -> Self {
        let coins = symbols
            .iter()
            .map(|s| Coin {
                id: s.id.clone(),
                name: s.name.clone(),
            })
            .collect();
        Self { store, coins }
    }

    /// Static symbol catalog, fixed at startup
    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    /// Snapshot of all latest streamed prices
    pub async fn latest_snapshot(&self) -> HashMap<String, LatestPrice> {
        self.store.all_latest().await
    }

    /// Snapshot of all baseline prices
    pub async fn baseline_snapshot(&self) -> HashMap<String, BaselinePrice> {
        self.store.all_baseline().await
    }
}
