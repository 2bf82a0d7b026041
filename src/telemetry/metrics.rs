//! Prometheus metrics

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};

/// Start the Prometheus scrape endpoint on the given port
pub(crate) fn install_prometheus(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!(%addr, "prometheus exporter listening");
    Ok(())
}

/// Count one applied price tick
pub fn record_tick(symbol: &str) {
    counter!("coinwatch_ticks_applied_total", "symbol" => symbol.to_string()).increment(1);
}

/// Count one supervised feed restart
pub fn record_feed_restart(symbol: &str) {
    counter!("coinwatch_feed_restarts_total", "symbol" => symbol.to_string()).increment(1);
}

/// Count one baseline refresh attempt by outcome
pub fn record_baseline_refresh(symbol: &str, success: bool) {
    let outcome = if success { "ok" } else { "error" };
    counter!(
        "coinwatch_baseline_refreshes_total",
        "symbol" => symbol.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
