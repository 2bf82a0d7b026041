//! Baseline reference prices
//!
//! A slower-moving reference price per symbol, refreshed on a fixed interval
//! independently of the streaming feed. Which reference the baseline
//! represents is an explicit configuration choice ([`crate::config::BaselineKind`]);
//! the three semantics are never conflated.

mod bybit;
mod persist;
mod refresher;

pub use bybit::BybitRest;
pub use persist::{BaselineDir, BaselineRecord};
pub use refresher::BaselineRefresher;

use async_trait::async_trait;
use rust_decimal::Decimal;

/// A request/response source of reference prices
#[async_trait]
pub trait BaselineSource: Send + Sync {
    /// Fetch the reference price for one exchange pair symbol.
    ///
    /// Any failure (network, status, payload) is returned as an error; the
    /// caller skips the symbol for the current cycle and moves on.
    async fn fetch(&self, ticker: &str) -> anyhow::Result<Decimal>;
}
