//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gate metrics (requests, threats, alert deliveries)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `gate_requests_total` (counter): requests by method, status
//! - `gate_request_duration_seconds` (histogram): decision + handler latency
//! - `gate_threats_total` (counter): detections by module, severity
//! - `gate_module_failures_total` (counter): absorbed module errors
//! - `gate_alert_submissions_total` (counter): submit outcomes by handler
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Recording helpers are free functions; call sites never touch macro
//!   syntax or label plumbing
//! - Before `init_metrics` installs the recorder, every helper is a no-op

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::model::ThreatSeverity;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Call once at startup. Installation failure is logged rather than fatal;
/// the gate keeps running without metrics.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one gateway request with its total latency.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "gate_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "gate_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a detected threat.
pub fn record_threat(module: &str, severity: ThreatSeverity) {
    counter!(
        "gate_threats_total",
        "module" => module.to_string(),
        "severity" => severity.to_string()
    )
    .increment(1);
}

/// Record a module error absorbed by the engine.
pub fn record_module_failure(module: &str) {
    counter!("gate_module_failures_total", "module" => module.to_string()).increment(1);
}

/// Record one alert submission outcome.
pub fn record_alert_submission(handler: &str, success: bool) {
    let outcome = if success { "ok" } else { "error" };
    counter!(
        "gate_alert_submissions_total",
        "handler" => handler.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
