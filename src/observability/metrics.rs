//! Metrics collection and exposition.
//!
//! # Metrics
//! - `htcpcp_requests_total` (counter): requests by method, status
//! - `htcpcp_request_duration_seconds` (histogram): handling latency
//! - `htcpcp_brews_total` (counter): successful brews by pot
//! - `htcpcp_active_connections` (gauge): current connection count
//! - `htcpcp_dropped_connections_total` (counter): connections closed without a response, by reason

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one answered request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    counter!("htcpcp_requests_total", &labels).increment(1);
    histogram!("htcpcp_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

/// Record a successful brew.
pub fn record_brew(pot_id: &str) {
    counter!("htcpcp_brews_total", "pot" => pot_id.to_string()).increment(1);
}

/// Record a connection dropped without a response (timeout, reset, ...).
pub fn record_dropped(reason: &'static str) {
    counter!("htcpcp_dropped_connections_total", "reason" => reason).increment(1);
}

pub fn set_active_connections(count: u64) {
    gauge!("htcpcp_active_connections").set(count as f64);
}
