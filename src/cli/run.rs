//! Run command: wire the store, feeds and refresher together

use crate::baseline::{BaselineDir, BaselineRefresher, BaselineSource, BybitRest};
use crate::config::Config;
use crate::feed::{spawn_ingest, BybitFeed, PriceFeed};
use crate::query::QueryService;
use crate::store::PriceStore;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

/// Interval for the periodic snapshot log line
const REPORT_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Args, Debug)]
pub struct RunArgs {}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let store = PriceStore::new(config.symbols.iter().map(|s| s.id.clone()));

        let persist = match &config.baseline.persist_dir {
            Some(dir) => Some(BaselineDir::new(dir)?),
            None => None,
        };
        let source: Arc<dyn BaselineSource> = Arc::new(BybitRest::new(&config.baseline)?);
        let refresher = BaselineRefresher::new(
            &config.baseline,
            config.symbols.clone(),
            source,
            store.clone(),
            persist,
        );

        // Last known baselines are available before the first poll completes
        refresher.load_persisted().await;
        tokio::spawn(refresher.run());

        let initial = Duration::from_secs(config.feed.initial_reconnect_secs);
        let max = Duration::from_secs(config.feed.max_reconnect_secs);
        for symbol in &config.symbols {
            let feed: Arc<dyn PriceFeed> = Arc::new(BybitFeed::new(symbol, &config.feed));
            spawn_ingest(feed, store.clone(), initial, max);
        }

        let query = QueryService::new(store, &config.symbols);
        tracing::info!(symbols = query.coins().len(), "coinwatch running");
        tokio::spawn(Self::report_loop(query));

        tokio::signal::ctrl_c().await?;
        tracing::info!("shutdown signal received");
        Ok(())
    }

    /// Log a snapshot of the merged view once a minute
    async fn report_loop(query: QueryService) {
        let mut interval = tokio::time::interval(REPORT_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        interval.tick().await;

        loop {
            interval.tick().await;
            let latest = query.latest_snapshot().await;
            let baseline = query.baseline_snapshot().await;
            for coin in query.coins() {
                let live = latest.get(&coin.id).map(|p| p.price).unwrap_or_default();
                let anchor = baseline.get(&coin.id).map(|p| p.price).unwrap_or_default();
                tracing::info!(symbol = %coin.id, latest = %live, baseline = %anchor, "price snapshot");
            }
        }
    }
}
