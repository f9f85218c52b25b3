//! # Metrics Collection
//!
//! Prometheus metrics for the HTTP surface and the secret lifecycle.

use std::net::SocketAddr;

use ::tracing::{info, warn};
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::config::ObservabilityConfig;
use crate::domain::Secret;
use crate::errors::{Error, Result};
use crate::lifecycle::{LifecycleError, LifecycleObserver};

/// Records application metrics through the `metrics` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsRecorder;

impl MetricsRecorder {
    /// Create a new metrics recorder instance
    pub fn new() -> Self {
        Self
    }

    /// Record a completed HTTP request
    pub fn record_http_request(
        &self,
        method: &str,
        route: &str,
        status: u16,
        duration: f64,
        response_bytes: Option<u64>,
    ) {
        counter!(
            "http_requests_total",
            "method" => method.to_string(),
            "route" => route.to_string(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            "http_request_duration_seconds",
            "method" => method.to_string(),
            "route" => route.to_string()
        )
        .record(duration);

        if let Some(bytes) = response_bytes {
            histogram!("http_response_size_bytes", "route" => route.to_string()).record(bytes as f64);
        }
    }

    pub fn record_secret_created(&self, remaining_views: u32) {
        counter!("secrets_created_total").increment(1);
        histogram!("secret_requested_views").record(f64::from(remaining_views));
    }

    pub fn record_secret_consumed(&self, exhausted: bool) {
        counter!("secrets_consumed_total").increment(1);
        if exhausted {
            counter!("secrets_exhausted_total").increment(1);
        }
    }

    pub fn record_secret_rejected(&self, operation: &str, reason: &str) {
        counter!(
            "secrets_rejected_total",
            "operation" => operation.to_string(),
            "reason" => reason.to_string()
        )
        .increment(1);
    }

    pub fn record_consume_conflict(&self) {
        counter!("secret_consume_conflicts_total").increment(1);
    }

    /// Register metric descriptions with the exporter
    pub fn register_metrics(&self) {
        describe_counter!("http_requests_total", Unit::Count, "HTTP requests by route and status");
        describe_histogram!(
            "http_request_duration_seconds",
            Unit::Seconds,
            "Time to produce an HTTP response"
        );
        describe_histogram!("http_response_size_bytes", Unit::Bytes, "Size of HTTP response bodies");
        describe_counter!("secrets_created_total", Unit::Count, "Secrets stored");
        describe_histogram!(
            "secret_requested_views",
            Unit::Count,
            "View limit requested for new secrets"
        );
        describe_counter!("secrets_consumed_total", Unit::Count, "Successful secret reads");
        describe_counter!(
            "secrets_exhausted_total",
            Unit::Count,
            "Reads that spent the last view of a secret"
        );
        describe_counter!(
            "secrets_rejected_total",
            Unit::Count,
            "Failed lifecycle operations by reason"
        );
        describe_counter!(
            "secret_consume_conflicts_total",
            Unit::Count,
            "Consume attempts retried after losing a compare-and-swap"
        );

        counter!("secrets_created_total").absolute(0);
        counter!("secrets_consumed_total").absolute(0);
        counter!("secret_consume_conflicts_total").absolute(0);
    }
}

/// [`LifecycleObserver`] that turns lifecycle events into metrics
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObserver {
    recorder: MetricsRecorder,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self { recorder: MetricsRecorder::new() }
    }
}

impl LifecycleObserver for MetricsObserver {
    fn on_created(&self, secret: &Secret) {
        self.recorder.record_secret_created(secret.remaining_views);
    }

    fn on_consumed(&self, secret: &Secret) {
        self.recorder.record_secret_consumed(secret.is_exhausted());
    }

    fn on_rejected(&self, operation: &'static str, error: &LifecycleError) {
        self.recorder.record_secret_rejected(operation, error.reason());
    }

    fn on_consume_conflict(&self, _handle: &str) {
        self.recorder.record_consume_conflict();
    }
}

/// Initialize metrics collection and the Prometheus exporter
pub async fn init_metrics(config: &ObservabilityConfig) -> Result<()> {
    if !config.enable_metrics {
        return Ok(());
    }

    let metrics_addr = match config.metrics_bind_address() {
        Some(addr) => addr,
        None => {
            warn!("Metrics disabled: no bind address configured");
            return Ok(());
        }
    };

    let socket_addr: SocketAddr = metrics_addr.parse().map_err(|e| {
        Error::config(format!("Invalid metrics bind address '{}': {}", metrics_addr, e))
    })?;

    let builder = PrometheusBuilder::new()
        .with_http_listener(socket_addr)
        .add_global_label("service", &config.service_name);

    builder
        .install()
        .map_err(|e| Error::config(format!("Failed to initialize metrics exporter: {}", e)))?;

    MetricsRecorder::new().register_metrics();

    info!(
        metrics_addr = %metrics_addr,
        service_name = %config.service_name,
        "Metrics collection initialized"
    );

    Ok(())
}
