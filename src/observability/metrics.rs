//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): relayed requests by status
//! - `router_request_duration_seconds` (histogram): relay latency
//! - `router_failovers_total` (counter): failed forwards by backend
//! - `router_backend_health` (gauge): 1=healthy, 0=unhealthy
//! - `router_pool_size` (gauge): instances in the pool
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(status: u16, start: Instant) {
    counter!("router_requests_total", "status" => status.to_string()).increment(1);
    histogram!("router_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_failover(backend: &str) {
    counter!("router_failovers_total", "backend" => backend.to_string()).increment(1);
}

pub fn record_backend_health(backend: &str, healthy: bool) {
    gauge!("router_backend_health", "backend" => backend.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_pool_size(size: usize) {
    gauge!("router_pool_size").set(size as f64);
}
