//! coinwatch: live cryptocurrency price aggregation
//!
//! This library provides the core components for:
//! - Per-symbol streaming ticker feeds from Bybit spot, with supervised
//!   reconnection
//! - A periodic baseline refresher polling a reference price per symbol,
//!   optionally persisted across restarts
//! - A concurrency-safe shared price store both writers feed into
//! - A read-only query surface over the merged view

pub mod baseline;
pub mod cli;
pub mod config;
pub mod feed;
pub mod query;
pub mod store;
pub mod telemetry;
pub mod ws;
