//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, mount
//! - `proxy_request_duration_seconds` (histogram): latency by method, mount
//!
//! # Design Decisions
//! - The exporter failing to start is logged, not fatal; the gateway keeps
//!   serving without metrics
//! - With no recorder installed (tests, metrics disabled) recording is a
//!   no-op

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter, listening on `addr`.
///
/// Must run inside a Tokio runtime; the exporter serves scrapes from a
/// background task.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed request.
pub fn record_request(method: &str, status: u16, mount: &str, start_time: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "mount" => mount.to_string()
    )
    .increment(1);

    histogram!(
        "proxy_request_duration_seconds",
        "method" => method.to_string(),
        "mount" => mount.to_string()
    )
    .record(start_time.elapsed().as_secs_f64());
}
