//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pipeline_stage_total` (counter): stage outcomes by stage, outcome
//! - `pipeline_classified_errors_total` (counter): caller-visible failures by category
//! - `pipeline_poll_attempts` (histogram): status queries per confirmed transaction
//! - `pipeline_rpc_requests_total` (counter): RPC calls by method, outcome
//! - `pipeline_endpoint_health` (gauge): 1=healthy, 0=unhealthy
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter with an HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one pipeline stage.
pub fn record_stage(stage: &'static str, outcome: &'static str) {
    counter!("pipeline_stage_total", "stage" => stage, "outcome" => outcome).increment(1);
}

/// Record a failure handed to the caller.
pub fn record_classified_error(category: &'static str) {
    counter!("pipeline_classified_errors_total", "category" => category).increment(1);
}

/// Record how many status queries a poll took.
pub fn record_poll_attempts(attempts: u32) {
    histogram!("pipeline_poll_attempts").record(f64::from(attempts));
}

/// Record one RPC call.
pub fn record_rpc_request(method: &'static str, outcome: &'static str) {
    counter!("pipeline_rpc_requests_total", "method" => method, "outcome" => outcome).increment(1);
}

/// Record endpoint reachability.
pub fn record_endpoint_health(endpoint: &str, healthy: bool) {
    gauge!("pipeline_endpoint_health", "endpoint" => endpoint.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
