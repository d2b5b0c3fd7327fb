//! Prometheus metrics for convert-service.
//!
//! HTTP request metrics come from `service_core::middleware::metrics`; this
//! module adds conversion outcomes and upstream latency, and renders
//! everything for `/metrics`.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Call once at startup.
pub fn init_metrics() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install Prometheus recorder: {}", e))?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| anyhow::anyhow!("failed to set metrics handle: already initialized"))?;

    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Record the outcome of one conversion.
pub fn record_conversion(format: &str, outcome: &'static str) {
    counter!(
        "conversions_total",
        "format" => format.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record how long the upstream model call took.
pub fn record_upstream_latency(provider: &'static str, duration_secs: f64) {
    histogram!("upstream_request_duration_seconds", "provider" => provider).record(duration_secs);
}

/// Record token usage reported by the model.
pub fn record_tokens(provider: &'static str, input_tokens: u32, output_tokens: u32) {
    counter!("upstream_tokens_total", "provider" => provider, "type" => "input")
        .increment(u64::from(input_tokens));
    counter!("upstream_tokens_total", "provider" => provider, "type" => "output")
        .increment(u64::from(output_tokens));
}
