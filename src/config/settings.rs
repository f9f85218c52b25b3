//! # Configuration Settings
//!
//! Defines the configuration structure for the Ephemera service.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// HTTP server configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// Backing key-value store configuration
    #[validate(nested)]
    pub store: StoreConfig,

    /// Secret lifecycle tuning
    #[validate(nested)]
    pub lifecycle: LifecycleConfig,

    /// Observability configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;

        self.validate_custom()?;

        Ok(())
    }

    /// Cross-field checks the validator derive cannot express
    fn validate_custom(&self) -> Result<()> {
        if self.observability.enable_metrics && self.server.port == self.observability.metrics_port {
            return Err(Error::config("Server and metrics ports cannot be the same"));
        }

        if self.store.backend == StoreBackend::Redis
            && !self.store.redis_url.starts_with("redis://")
            && !self.store.redis_url.starts_with("rediss://")
        {
            return Err(Error::config("Redis URL must start with 'redis://' or 'rediss://'"));
        }

        // Every store call a request can make must fit inside the request deadline
        let worst_case = self.store.operation_timeout() * self.lifecycle.max_store_calls();
        if worst_case >= self.server.request_timeout() {
            return Err(Error::config(format!(
                "Store operation timeout of {}ms allows {}ms of store calls per request, \
                 which exceeds the {}s request timeout",
                self.store.operation_timeout_ms,
                worst_case.as_millis(),
                self.server.request_timeout_seconds
            )));
        }

        if let Some(namespace) = &self.store.namespace {
            if namespace.is_empty() || namespace.contains(char::is_whitespace) {
                return Err(Error::config("Store namespace must be non-empty and contain no whitespace"));
            }
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub request_timeout_seconds: u64,

    /// Maximum request body size in bytes
    #[validate(range(min = 1024, message = "Max body size must be at least 1KB"))]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_seconds: 10,
            max_body_size: 64 * 1024,
        }
    }
}

impl ServerConfig {
    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Which key-value backend holds the secrets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Redis (or any RESP-compatible server such as Valkey)
    Redis,
    /// Process-local map, for development and tests
    Memory,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Redis => write!(f, "redis"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Backing store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StoreConfig {
    /// Backend selection
    pub backend: StoreBackend,

    /// Redis connection URL
    #[validate(length(min = 1, message = "Redis URL cannot be empty"))]
    pub redis_url: String,

    /// Optional key prefix; keys become `namespace:handle`
    pub namespace: Option<String>,

    /// Upper bound for a single store round trip, in milliseconds
    #[validate(range(
        min = 10,
        max = 60000,
        message = "Operation timeout must be between 10ms and 60s"
    ))]
    pub operation_timeout_ms: u64,

    /// How often the in-memory backend sweeps out expired entries
    #[validate(range(
        min = 1,
        max = 86400,
        message = "Purge interval must be between 1 second and 1 day"
    ))]
    pub purge_interval_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Redis,
            redis_url: "redis://127.0.0.1:6379/0".to_string(),
            namespace: None,
            operation_timeout_ms: 500,
            purge_interval_seconds: 60,
        }
    }
}

impl StoreConfig {
    /// Get the per-operation timeout as Duration
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    /// Get the in-memory purge period as Duration
    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_seconds)
    }
}

/// Secret lifecycle tuning
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LifecycleConfig {
    /// Number of characters in a generated handle
    #[validate(range(min = 8, max = 64, message = "Handle length must be between 8 and 64"))]
    pub handle_length: usize,

    /// How many fresh handles to try when a generated one is already taken
    #[validate(range(min = 1, max = 10, message = "Handle attempts must be between 1 and 10"))]
    pub max_handle_attempts: u32,

    /// How many compare-and-swap rounds a consume may lose before giving up
    #[validate(range(min = 1, max = 64, message = "Consume attempts must be between 1 and 64"))]
    pub max_consume_attempts: u32,

    /// Optional upper bound on `expireAfterViews`
    #[validate(range(min = 1, message = "Max views must be at least 1"))]
    pub max_views: Option<u32>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self { handle_length: 10, max_handle_attempts: 3, max_consume_attempts: 8, max_views: None }
    }
}

impl LifecycleConfig {
    /// Most store round trips a single create or consume can make.
    ///
    /// A consume round is a get plus a compare-and-swap; a create attempt is
    /// one insert.
    pub fn max_store_calls(&self) -> u32 {
        (self.max_consume_attempts * 2).max(self.max_handle_attempts)
    }
}

/// Observability configuration for logging and metrics
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full EnvFilter directive
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,

    /// Enable metrics collection
    pub enable_metrics: bool,

    /// Metrics server port (0 = disabled)
    pub metrics_port: u16,

    /// Service name attached to exported metrics
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logging: false,
            enable_metrics: true,
            metrics_port: 9090,
            service_name: "ephemera".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// Get metrics bind address (None if disabled)
    pub fn metrics_bind_address(&self) -> Option<String> {
        if self.metrics_port == 0 {
            None
        } else {
            Some(format!("0.0.0.0:{}", self.metrics_port))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_config_bind_address() {
        let config = ServerConfig { host: "127.0.0.1".to_string(), port: 8081, ..Default::default() };
        assert_eq!(config.bind_address(), "127.0.0.1:8081");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_store_config_timeout() {
        let config = StoreConfig { operation_timeout_ms: 250, ..Default::default() };
        assert_eq!(config.operation_timeout(), Duration::from_millis(250));
        assert_eq!(config.purge_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_store_calls_must_fit_request_timeout() {
        assert_eq!(LifecycleConfig::default().max_store_calls(), 16);

        // A single stalled call outlives the request
        let mut config = AppConfig::default();
        config.server.request_timeout_seconds = 1;
        config.store.operation_timeout_ms = 5000;
        assert!(config.validate().is_err());

        // 8 rounds of get + swap at 1s each exceed a 10s request
        let mut config = AppConfig::default();
        config.store.operation_timeout_ms = 1000;
        assert!(config.validate().is_err());

        config.lifecycle.max_consume_attempts = 4;
        assert!(config.validate().is_ok());

        let mut config = AppConfig::default();
        config.store.purge_interval_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_observability_config_metrics_address() {
        let config = ObservabilityConfig { metrics_port: 9100, ..Default::default() };
        assert_eq!(config.metrics_bind_address(), Some("0.0.0.0:9100".to_string()));

        let disabled_config = ObservabilityConfig { metrics_port: 0, ..Default::default() };
        assert_eq!(disabled_config.metrics_bind_address(), None);
    }

    #[test]
    fn test_config_validation_errors() {
        // Port conflict
        let mut config = AppConfig::default();
        config.server.port = 9090;
        assert!(config.validate().is_err());

        // Wrong URL scheme
        let mut config = AppConfig::default();
        config.store.redis_url = "http://localhost:6379".to_string();
        assert!(config.validate().is_err());

        // Scheme is irrelevant for the memory backend
        config.store.backend = StoreBackend::Memory;
        assert!(config.validate().is_ok());

        // Blank namespace
        let mut config = AppConfig::default();
        config.store.namespace = Some(" ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_ranges() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.lifecycle.handle_length = 4;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.lifecycle.max_consume_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.lifecycle.max_views = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_backend_serialization() {
        let json = serde_json::to_string(&StoreBackend::Memory).unwrap();
        assert_eq!(json, "\"memory\"");
        let parsed: StoreBackend = serde_json::from_str("\"redis\"").unwrap();
        assert_eq!(parsed, StoreBackend::Redis);
        assert_eq!(StoreBackend::Redis.to_string(), "redis");
    }
}
