//! # Store Construction
//!
//! Builds the configured [`SecretStore`] backend behind a shared handle.

use std::sync::Arc;

use crate::config::{StoreBackend, StoreConfig};
use crate::errors::{Error, Result};

use super::{InMemorySecretStore, RedisSecretStore, SecretStore};

/// Shared handle to the active store
pub type SharedStore = Arc<dyn SecretStore>;

/// Create the store selected by `config`.
pub async fn create_store(config: &StoreConfig) -> Result<SharedStore> {
    validate_config(config)?;

    let store: SharedStore = match config.backend {
        StoreBackend::Redis => {
            let store = RedisSecretStore::connect(&config.redis_url, config.namespace.clone())
                .await
                .map_err(|e| {
                    tracing::error!(
                        error = %e,
                        url = %sanitize_url(&config.redis_url),
                        "Failed to create Redis store"
                    );
                    Error::Store(e)
                })?;
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; secrets will not survive a restart");
            Arc::new(create_memory_store(config))
        }
    };

    tracing::info!(
        backend = store.backend_name(),
        url = %sanitize_url(&config.redis_url),
        namespace = ?config.namespace,
        operation_timeout_ms = config.operation_timeout_ms,
        "Secret store created"
    );

    Ok(store)
}

/// In-memory store with its expiry sweep already running.
///
/// The sweep stops on its own once the store is dropped.
pub fn create_memory_store(config: &StoreConfig) -> InMemorySecretStore {
    let store = InMemorySecretStore::new();
    store.spawn_purge_task(config.purge_interval());

    tracing::debug!(
        purge_interval_seconds = config.purge_interval_seconds,
        "Started in-memory expiry sweep"
    );
    store
}

fn validate_config(config: &StoreConfig) -> Result<()> {
    if config.operation_timeout_ms == 0 {
        return Err(Error::config("store operation timeout must be greater than 0"));
    }

    if config.backend == StoreBackend::Redis && config.redis_url.is_empty() {
        return Err(Error::config("Redis URL cannot be empty"));
    }

    Ok(())
}

/// Sanitize a store URL for logging (remove credentials)
pub fn sanitize_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) if parsed.password().is_some() || !parsed.username().is_empty() => format!(
            "{}://***:***@{}{}{}",
            parsed.scheme(),
            parsed.host_str().unwrap_or("unknown"),
            parsed.port().map(|p| format!(":{}", p)).unwrap_or_default(),
            parsed.path()
        ),
        _ => url.to_string(),
    }
}
