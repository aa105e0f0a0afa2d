//! Metrics collection and exposition.
//!
//! # Metrics
//! - `backend_requests_total` (counter): requests by operation and status
//! - `backend_request_duration_seconds` (histogram): latency by operation
//!
//! # Design Decisions
//! - Prometheus exporter only when enabled in config
//! - Labels are low-cardinality (operation, status code)

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished backend request.
pub fn record_request(operation: &str, status: u16, start: Instant) {
    let labels = [
        ("operation", operation.to_string()),
        ("status", status.to_string()),
    ];
    counter!("backend_requests_total", &labels).increment(1);
    histogram!("backend_request_duration_seconds", "operation" => operation.to_string())
        .record(start.elapsed().as_secs_f64());
}
