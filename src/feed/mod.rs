//! Streaming price feeds
//!
//! One feed per tracked symbol pushes ticks into the shared price store.
//! Feeds are run under a supervising retry loop: a stream that ends for any
//! reason is restarted with backoff, never left dead.

mod bybit;
mod types;

pub use bybit::BybitFeed;
pub use types::PriceTick;

use crate::store::PriceStore;
use crate::telemetry;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Trait for streaming price feed implementations
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Symbol id this feed produces ticks for (e.g. "BTC")
    fn symbol(&self) -> &str;

    /// Open the stream and return the tick receiver
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<PriceTick>>;
}

/// Run one feed under supervision, applying its ticks to the store.
///
/// The task never exits on its own: when the tick stream ends or the
/// subscription fails, it re-subscribes after a capped exponential delay.
pub fn spawn_ingest(
    feed: Arc<dyn PriceFeed>,
    store: PriceStore,
    initial_delay: Duration,
    max_delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut delay = initial_delay;

        loop {
            match feed.subscribe().await {
                Ok(mut ticks) => {
                    delay = initial_delay;
                    while let Some(tick) = ticks.recv().await {
                        store.set_latest(&tick.symbol, tick.price).await;
                        telemetry::record_tick(&tick.symbol);
                    }
                    tracing::warn!(symbol = %feed.symbol(), "price stream ended, restarting");
                }
                Err(e) => {
                    tracing::warn!(symbol = %feed.symbol(), error = %e, "feed subscription failed");
                }
            }

            telemetry::record_feed_restart(feed.symbol());
            sleep(delay).await;
            delay = (delay * 2).min(max_delay);
        }
    })
}
