//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_requests_total` (counter): requests by method, status
//! - `gate_request_duration_seconds` (histogram): latency distribution
//! - `gate_rate_limited_total` (counter): requests rejected by the rate limiter
//! - `gate_rate_windows` (gauge): live per-IP windows
//! - `gate_reputation_lookups_total` (counter): lookups by outcome
//! - `gate_reputation_lookup_seconds` (histogram): lookup latency
//! - `gate_decisions_total` (counter): access gate decisions
//! - `gate_audit_writes_total` (counter): audit inserts by outcome
//! - `gate_audit_deletes_total` (counter): console deletions by outcome

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "gate_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gate_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited() {
    counter!("gate_rate_limited_total").increment(1);
}

pub fn record_rate_windows(count: usize) {
    gauge!("gate_rate_windows").set(count as f64);
}

pub fn record_lookup(outcome: &'static str, start: Instant) {
    counter!("gate_reputation_lookups_total", "outcome" => outcome).increment(1);
    histogram!("gate_reputation_lookup_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_decision(decision: &'static str) {
    counter!("gate_decisions_total", "decision" => decision).increment(1);
}

pub fn record_audit_write(outcome: &'static str) {
    counter!("gate_audit_writes_total", "outcome" => outcome).increment(1);
}

pub fn record_audit_delete(outcome: &'static str, count: usize) {
    counter!("gate_audit_deletes_total", "outcome" => outcome).increment(count as u64);
}
