//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): dispatch cycles by method, status
//! - `dispatch_duration_seconds` (histogram): time spent in one cycle
//! - `pool_wrappers_created_total` (counter): pool misses by wrapper kind

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished dispatch cycle.
pub fn record_dispatch(method: &str, status: u16, started: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    counter!("dispatch_requests_total", &labels).increment(1);
    histogram!("dispatch_duration_seconds", &labels).record(started.elapsed().as_secs_f64());
}

/// Record that a pool had to construct a new wrapper.
pub fn record_pool_miss(kind: &'static str) {
    counter!("pool_wrappers_created_total", "kind" => kind).increment(1);
}
