//! Fixed-interval baseline refresh loop

use super::{BaselineDir, BaselineRecord, BaselineSource};
use crate::config::{BaselineConfig, BaselineKind, SymbolConfig};
use crate::store::PriceStore;
use crate::telemetry;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

/// Periodically captures a reference price per symbol into the store.
///
/// A single symbol's failure is logged and skipped; it never aborts the
/// cycle for the remaining symbols.
pub struct BaselineRefresher {
    symbols: Vec<SymbolConfig>,
    kind: BaselineKind,
    interval: Duration,
    source: Arc<dyn BaselineSource>,
    store: PriceStore,
    persist: Option<BaselineDir>,
}

impl BaselineRefresher {
    pub fn new(
        config: &BaselineConfig,
        symbols: Vec<SymbolConfig>,
        source: Arc<dyn BaselineSource>,
        store: PriceStore,
        persist: Option<BaselineDir>,
    ) -> Self {
        Self {
            symbols,
            kind: config.semantics,
            interval: Duration::from_secs(config.interval_secs),
            source,
            store,
            persist,
        }
    }

    /// Seed the store from durable records, before the first poll.
    ///
    /// Absent records mean "not yet known"; unreadable ones are logged and
    /// skipped. Never fails startup.
    pub async fn load_persisted(&self) {
        let Some(dir) = &self.persist else { return };

        for symbol in &self.symbols {
            match dir.load(&symbol.id) {
                Ok(Some(record)) => {
                    self.store
                        .set_baseline(&symbol.id, record.price, record.time)
                        .await;
                    tracing::info!(symbol = %symbol.id, price = %record.price, "restored persisted baseline");
                }
                Ok(None) => {
                    tracing::debug!(symbol = %symbol.id, "no persisted baseline");
                }
                Err(e) => {
                    tracing::warn!(symbol = %symbol.id, error = %e, "failed to read persisted baseline");
                }
            }
        }
    }

    /// Run refresh cycles forever. The first cycle starts immediately.
    pub async fn run(self) {
        tracing::info!(
            kind = ?self.kind,
            interval_secs = self.interval.as_secs(),
            "baseline refresher started"
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            self.run_cycle().await;
        }
    }

    /// One pass over all symbols
    pub async fn run_cycle(&self) {
        for symbol in &self.symbols {
            match self.refresh_symbol(symbol).await {
                Ok(price) => {
                    tracing::debug!(symbol = %symbol.id, price = %price, "baseline refreshed");
                    telemetry::record_baseline_refresh(&symbol.id, true);
                }
                Err(e) => {
                    tracing::warn!(symbol = %symbol.id, error = %e, "baseline refresh failed, skipping");
                    telemetry::record_baseline_refresh(&symbol.id, false);
                }
            }
        }
    }

    async fn refresh_symbol(&self, symbol: &SymbolConfig) -> anyhow::Result<Decimal> {
        let price = match self.kind {
            BaselineKind::Reanchor => {
                let latest = self
                    .store
                    .latest(&symbol.id)
                    .await
                    .ok_or_else(|| anyhow::anyhow!("symbol not tracked"))?;
                if latest.updated_at.is_none() {
                    anyhow::bail!("no streamed price to re-anchor from yet");
                }
                latest.price
            }
            BaselineKind::PointInTime | BaselineKind::Prev24h => {
                self.source.fetch(&symbol.ticker).await?
            }
        };

        let captured_at = Utc::now();
        self.store
            .set_baseline(&symbol.id, price, captured_at)
            .await;

        if let Some(dir) = &self.persist {
            let record = BaselineRecord {
                price,
                time: captured_at,
            };
            // A persistence failure degrades restart behavior only; the
            // in-memory baseline is already committed
            if let Err(e) = dir.save(&symbol.id, &record) {
                tracing::warn!(symbol = %symbol.id, error = %e, "failed to persist baseline record");
            }
        }

        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::collections::{HashMap, HashSet};

    /// Source serving fixed prices, with a configurable set of failing tickers
    struct FakeSource {
        prices: HashMap<String, Decimal>,
        failing: HashSet<String>,
    }

    impl FakeSource {
        fn new(prices: &[(&str, Decimal)], failing: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                prices: prices
                    .iter()
                    .map(|(t, p)| (t.to_string(), *p))
                    .collect(),
                failing: failing.iter().map(|t| t.to_string()).collect(),
            })
        }
    }

    #[async_trait]
    impl BaselineSource for FakeSource {
        async fn fetch(&self, ticker: &str) -> anyhow::Result<Decimal> {
            if self.failing.contains(ticker) {
                anyhow::bail!("server returned status 500");
            }
            self.prices
                .get(ticker)
                .copied()
                .ok_or_else(|| anyhow::anyhow!("unknown ticker"))
        }
    }

    fn symbols() -> Vec<SymbolConfig> {
        vec![
            SymbolConfig::new("BTC", "Bitcoin", "BTCUSDC"),
            SymbolConfig::new("ETH", "Ethereum", "ETHUSDC"),
            SymbolConfig::new("SOL", "Solana", "SOLUSDC"),
        ]
    }

    fn store() -> PriceStore {
        PriceStore::new(["BTC", "ETH", "SOL"])
    }

    #[tokio::test]
    async fn test_cycle_updates_all_symbols() {
        let source = FakeSource::new(
            &[
                ("BTCUSDC", dec!(66500.00)),
                ("ETHUSDC", dec!(3400.00)),
                ("SOLUSDC", dec!(150.00)),
            ],
            &[],
        );
        let store = store();
        let refresher = BaselineRefresher::new(
            &BaselineConfig::default(),
            symbols(),
            source,
            store.clone(),
            None,
        );

        refresher.run_cycle().await;

        let baseline = store.all_baseline().await;
        assert_eq!(baseline["BTC"].price, dec!(66500.00));
        assert_eq!(baseline["ETH"].price, dec!(3400.00));
        assert_eq!(baseline["SOL"].price, dec!(150.00));
        assert!(baseline["BTC"].captured_at.is_some());
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_cycle() {
        // ETH returns a server error; BTC and SOL must still update
        let source = FakeSource::new(
            &[("BTCUSDC", dec!(66500.00)), ("SOLUSDC", dec!(150.00))],
            &["ETHUSDC"],
        );
        let store = store();
        let refresher = BaselineRefresher::new(
            &BaselineConfig::default(),
            symbols(),
            source,
            store.clone(),
            None,
        );

        refresher.run_cycle().await;

        let baseline = store.all_baseline().await;
        assert_eq!(baseline["BTC"].price, dec!(66500.00));
        assert_eq!(baseline["SOL"].price, dec!(150.00));
        // Unchanged from its prior (zero) state
        assert_eq!(baseline["ETH"].price, Decimal::ZERO);
        assert!(baseline["ETH"].captured_at.is_none());
    }

    #[tokio::test]
    async fn test_failed_symbol_keeps_prior_baseline() {
        let ok = FakeSource::new(&[("ETHUSDC", dec!(3400.00))], &[]);
        let failing = FakeSource::new(&[], &["ETHUSDC"]);
        let store = PriceStore::new(["ETH"]);
        let syms = vec![SymbolConfig::new("ETH", "Ethereum", "ETHUSDC")];
        let config = BaselineConfig::default();

        BaselineRefresher::new(&config, syms.clone(), ok, store.clone(), None)
            .run_cycle()
            .await;
        BaselineRefresher::new(&config, syms, failing, store.clone(), None)
            .run_cycle()
            .await;

        // Second (failing) cycle left the first cycle's value in place
        assert_eq!(store.baseline("ETH").await.unwrap().price, dec!(3400.00));
    }

    #[tokio::test]
    async fn test_reanchor_copies_streamed_price() {
        let source = FakeSource::new(&[], &[]);
        let store = store();
        store.set_latest("BTC", dec!(67123.50)).await;

        let config = BaselineConfig {
            semantics: BaselineKind::Reanchor,
            ..Default::default()
        };
        let refresher =
            BaselineRefresher::new(&config, symbols(), source, store.clone(), None);
        refresher.run_cycle().await;

        // BTC re-anchored from the stream; ETH/SOL had no tick yet and skip
        assert_eq!(store.baseline("BTC").await.unwrap().price, dec!(67123.50));
        assert!(store.baseline("ETH").await.unwrap().captured_at.is_none());
    }

    #[tokio::test]
    async fn test_persisted_baseline_survives_restart() {
        let tmp = tempfile::tempdir().unwrap();
        let source = FakeSource::new(&[("BTCUSDC", dec!(66500.00))], &[]);
        let syms = vec![SymbolConfig::new("BTC", "Bitcoin", "BTCUSDC")];
        let config = BaselineConfig::default();

        let first_store = PriceStore::new(["BTC"]);
        let refresher = BaselineRefresher::new(
            &config,
            syms.clone(),
            source,
            first_store,
            Some(BaselineDir::new(tmp.path()).unwrap()),
        );
        refresher.run_cycle().await;

        // "Restart": fresh store, source now failing, records still on disk
        let second_store = PriceStore::new(["BTC"]);
        let refresher = BaselineRefresher::new(
            &config,
            syms,
            FakeSource::new(&[], &["BTCUSDC"]),
            second_store.clone(),
            Some(BaselineDir::new(tmp.path()).unwrap()),
        );
        refresher.load_persisted().await;

        let entry = second_store.baseline("BTC").await.unwrap();
        assert_eq!(entry.price, dec!(66500.00));
        assert!(entry.captured_at.is_some());
    }

    #[tokio::test]
    async fn test_load_persisted_without_records_is_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store();
        let refresher = BaselineRefresher::new(
            &BaselineConfig::default(),
            symbols(),
            FakeSource::new(&[], &[]),
            store.clone(),
            Some(BaselineDir::new(tmp.path()).unwrap()),
        );

        refresher.load_persisted().await;
        assert!(store.baseline("BTC").await.unwrap().captured_at.is_none());
    }
}
