//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pipeline_requests_total` (counter): transport exchanges by method, status
//! - `pipeline_request_duration_seconds` (histogram): transport latency
//! - `pipeline_retries_total` (counter): retries by method and triggering status
//! - `pipeline_redirects_total` (counter): redirects followed by status
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Only the binary installs the Prometheus recorder

use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record one transport exchange.
pub fn record_request(method: &str, status: u16, start_time: Instant) {
    counter!(
        "pipeline_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("pipeline_request_duration_seconds", "method" => method.to_string())
        .record(start_time.elapsed().as_secs_f64());
}

pub fn record_retry(method: &str, status: u16) {
    counter!(
        "pipeline_retries_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_redirect(status: u16) {
    counter!("pipeline_redirects_total", "status" => status.to_string()).increment(1);
}
