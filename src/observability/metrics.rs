//! Metrics collection and exposition.
//!
//! # Metrics
//! - `healthcombiner_requests_total` (counter): front door responses by status
//! - `healthcombiner_request_duration_seconds` (histogram): aggregation latency
//! - `healthcombiner_probes_total` (counter): outbound probes by result
//! - `healthcombiner_topology_reloads_total` (counter): reloads by outcome
//! - `healthcombiner_cache_available` (gauge): 1=available, 0=unavailable
//!
//! `healthcombiner_cache_available` keeps one series per cache ever seen;
//! caches removed from the topology keep their last value until restart.
//!
//! Recording goes through the `metrics` facade and is a no-op until an
//! exporter is installed.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(status: u16, start: Instant) {
    metrics::counter!("healthcombiner_requests_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("healthcombiner_request_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

pub fn record_probe(available: bool) {
    let result = if available { "available" } else { "unavailable" };
    metrics::counter!("healthcombiner_probes_total", "result" => result).increment(1);
}

pub fn record_topology_reload(outcome: &'static str) {
    metrics::counter!("healthcombiner_topology_reloads_total", "outcome" => outcome).increment(1);
}

pub fn record_cache_availability(cache: &str, available: bool) {
    metrics::gauge!("healthcombiner_cache_available", "cache" => cache.to_string())
        .set(if available { 1.0 } else { 0.0 });
}
