//! Metrics collection and exposition.
//!
//! # Metrics
//! - `xff_requests_total` (counter): requests by filter outcome
//!   (`untrusted`, `unchanged`, `rewritten`)

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::forwarded::Resolution;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_resolution(resolution: Resolution) {
    ::metrics::counter!("xff_requests_total", "outcome" => resolution.as_str()).increment(1);
}
