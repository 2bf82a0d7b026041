//! Telemetry
//!
//! Structured logging and Prometheus metrics

mod logging;
mod metrics;

pub use logging::init_logging;
pub use metrics::{record_baseline_refresh, record_feed_restart, record_tick};

use crate::config::TelemetryConfig;

/// Guard that pins telemetry for the process lifetime
pub struct TelemetryGuard {
    _priv: (),
}

/// Initialize logging and, when a port is configured, the metrics exporter
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    init_logging(&config.log_level)?;

    if let Some(port) = config.metrics_port {
        metrics::install_prometheus(port)?;
    }

    Ok(TelemetryGuard { _priv: () })
}
