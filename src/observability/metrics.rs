//! Metrics collection and exposition.
//!
//! # Metrics
//! - `adapter_invocations_total` (counter): invocations by protocol, outcome
//! - `adapter_invocation_duration_seconds` (histogram): latency by protocol
//! - `adapter_prerendered_hits_total` (counter): short-circuited requests

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished invocation.
pub fn record_invocation(protocol: &str, outcome: &'static str, start: Instant) {
    let protocol = protocol.to_string();
    metrics::counter!(
        "adapter_invocations_total",
        "protocol" => protocol.clone(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("adapter_invocation_duration_seconds", "protocol" => protocol)
        .record(start.elapsed().as_secs_f64());
}

/// Record a request answered from the prerendered set.
pub fn record_prerendered_hit(protocol: &str) {
    metrics::counter!("adapter_prerendered_hits_total", "protocol" => protocol.to_string()).increment(1);
}
