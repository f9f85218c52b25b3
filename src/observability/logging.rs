//! # Structured Logging
//!
//! Subscriber setup and span macros for the tracing ecosystem.
//!
//! The filter comes from `RUST_LOG` when set, otherwise from the configured
//! `log_level`. With `json_logging` enabled every event is written as one JSON
//! object per line, span fields included, for log shippers.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};

/// Create a tracing span for request tracking.
///
/// ```rust,ignore
/// let span = request_span!("GET", "/v1/secret/abc");
/// let span = request_span!("POST", "/v1/secret", route = "/v1/secret");
/// ```
#[macro_export]
macro_rules! request_span {
    ($method:expr, $path:expr) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4(),
            status = tracing::field::Empty
        )
    };
    ($method:expr, $path:expr, $($field:tt)*) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4(),
            status = tracing::field::Empty,
            $($field)*
        )
    };
}

/// Create a tracing span for a single store round trip.
#[macro_export]
macro_rules! store_span {
    ($operation:expr, $backend:expr) => {
        tracing::debug_span!(
            "store_operation",
            operation = %$operation,
            backend = %$backend
        )
    };
}

/// Install the global subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| Error::config(format!("Invalid log level '{}': {}", config.log_level, e)))?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json_logging {
        registry.with(fmt::layer().json().with_current_span(true).with_span_list(false)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true).compact()).try_init()
    };

    result.map_err(|e| Error::internal(format!("Failed to install log subscriber: {}", e)))
}

/// Log configuration at startup
pub fn log_config_info(config: &crate::config::AppConfig) {
    tracing::info!(
        server_address = %config.server.bind_address(),
        store_backend = %config.store.backend,
        store_url = %crate::storage::pool::sanitize_url(&config.store.redis_url),
        namespace = ?config.store.namespace,
        handle_length = config.lifecycle.handle_length,
        max_views = ?config.lifecycle.max_views,
        metrics_enabled = %config.observability.enable_metrics,
        "Ephemera configuration"
    );
}
