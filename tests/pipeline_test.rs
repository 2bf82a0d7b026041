//! End-to-end behavior of the aggregation core: feeds and refresher writing
//! into one store, read through the query surface

use async_trait::async_trait;
use coinwatch::baseline::{BaselineDir, BaselineRefresher, BaselineSource};
use coinwatch::config::{BaselineConfig, SymbolConfig};
use coinwatch::query::QueryService;
use coinwatch::store::PriceStore;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

/// Source where ETH always fails with a server error
struct PartiallyDownSource;

#[async_trait]
impl BaselineSource for PartiallyDownSource {
    async fn fetch(&self, ticker: &str) -> anyhow::Result<Decimal> {
        match ticker {
            "ETHUSDC" => anyhow::bail!("bybit tickers returned status 500"),
            "BTCUSDC" => Ok(dec!(66500.00)),
            "SOLUSDC" => Ok(dec!(150.00)),
            other => anyhow::bail!("unknown ticker {}", other),
        }
    }
}

fn symbols() -> Vec<SymbolConfig> {
    vec![
        SymbolConfig::new("BTC", "Bitcoin", "BTCUSDC"),
        SymbolConfig::new("ETH", "Ethereum", "ETHUSDC"),
        SymbolConfig::new("SOL", "Solana", "SOLUSDC"),
    ]
}

#[tokio::test]
async fn partial_failures_still_produce_a_well_formed_view() {
    let symbols = symbols();
    let store = PriceStore::new(symbols.iter().map(|s| s.id.clone()));
    let query = QueryService::new(store.clone(), &symbols);

    // Live ticks arrive for BTC only
    store.set_latest("BTC", dec!(67123.50)).await;

    let refresher = BaselineRefresher::new(
        &BaselineConfig::default(),
        symbols,
        Arc::new(PartiallyDownSource),
        store,
        None,
    );
    refresher.run_cycle().await;

    // The snapshot is complete: resolved symbols carry data, unresolved
    // ones their zero values, and ETH's failure cost nobody else anything
    let latest = query.latest_snapshot().await;
    assert_eq!(latest.len(), 3);
    assert_eq!(latest["BTC"].price, dec!(67123.50));
    assert_eq!(latest["ETH"].price, Decimal::ZERO);

    let baseline = query.baseline_snapshot().await;
    assert_eq!(baseline.len(), 3);
    assert_eq!(baseline["BTC"].price, dec!(66500.00));
    assert_eq!(baseline["SOL"].price, dec!(150.00));
    assert_eq!(baseline["ETH"].price, Decimal::ZERO);
    assert!(baseline["ETH"].captured_at.is_none());
}

#[tokio::test]
async fn restart_serves_last_known_baseline_before_first_poll() {
    let tmp = tempfile::tempdir().unwrap();
    let symbols = symbols();

    // First process life: one successful cycle, records written
    {
        let store = PriceStore::new(symbols.iter().map(|s| s.id.clone()));
        let refresher = BaselineRefresher::new(
            &BaselineConfig::default(),
            symbols.clone(),
            Arc::new(PartiallyDownSource),
            store,
            Some(BaselineDir::new(tmp.path()).unwrap()),
        );
        refresher.run_cycle().await;
    }

    // Second life: before any poll, the query layer already answers with
    // the persisted values
    let store = PriceStore::new(symbols.iter().map(|s| s.id.clone()));
    let query = QueryService::new(store.clone(), &symbols);
    let refresher = BaselineRefresher::new(
        &BaselineConfig::default(),
        symbols,
        Arc::new(PartiallyDownSource),
        store,
        Some(BaselineDir::new(tmp.path()).unwrap()),
    );
    refresher.load_persisted().await;

    let baseline = query.baseline_snapshot().await;
    assert_eq!(baseline["BTC"].price, dec!(66500.00));
    assert_eq!(baseline["SOL"].price, dec!(150.00));
    // ETH never succeeded, so it is still unknown
    assert!(baseline["ETH"].captured_at.is_none());
}
