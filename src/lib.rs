//! # Ephemera
//!
//! Ephemera is a limited-view secret sharing service. A client submits text and
//! receives a random handle; the text can then be read a bounded number of
//! times, and never after its expiry, before it is gone for good.
//!
//! ## Architecture
//!
//! ```text
//! HTTP API (axum) → Secret Lifecycle → Secret Store (Redis | memory)
//!      ↓                   ↓
//!   Metrics         Lifecycle Observer
//! ```
//!
//! ## Core Components
//!
//! - **Domain**: the persisted [`domain::Secret`] record and handle generation
//! - **Storage**: get / insert-if-absent / compare-and-swap over a key-value store
//! - **Lifecycle**: create and consume with view-count, expiry and concurrency rules
//! - **API**: form decoding, JSON/XML negotiation and the error-to-status mapping
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use ephemera::{config::AppConfig, Result, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::default();
//!     let server = Server::new(config).await?;
//!     server.run().await
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod lifecycle;
pub mod observability;
pub mod storage;

use std::sync::Arc;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use domain::Secret;
pub use errors::{Error, Result};
pub use lifecycle::{LifecycleError, SecretLifecycle};

use lifecycle::{LifecycleObserver, NoopObserver};
use observability::MetricsObserver;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// Wires the store, lifecycle engine and HTTP API together
pub struct Server {
    config: AppConfig,
    lifecycle: Arc<SecretLifecycle>,
}

impl Server {
    /// Connect to the configured store and build the lifecycle engine
    pub async fn new(config: AppConfig) -> Result<Self> {
        let store = storage::create_store(&config.store).await?;

        let observer: Arc<dyn LifecycleObserver> = if config.observability.enable_metrics {
            Arc::new(MetricsObserver::new())
        } else {
            Arc::new(NoopObserver)
        };

        let lifecycle = SecretLifecycle::new(
            store,
            config.lifecycle.clone(),
            config.store.operation_timeout(),
        )
        .with_observer(observer);

        Ok(Self { config, lifecycle: Arc::new(lifecycle) })
    }

    /// Serve the API until Ctrl-C
    pub async fn run(self) -> Result<()> {
        tracing::info!(
            app_name = APP_NAME,
            version = VERSION,
            store = self.lifecycle.store().backend_name(),
            "Starting Ephemera server"
        );

        let state = api::ApiState::new(self.lifecycle.clone());
        api::start_api_server(&self.config.server, state).await?;

        tracing::info!("Shutting down server");
        Ok(())
    }

    /// Get a reference to the server configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the lifecycle engine the server dispatches to
    pub fn lifecycle(&self) -> &Arc<SecretLifecycle> {
        &self.lifecycle
    }
}

/// Build and run a [`Server`] for `config`
pub async fn run_server(config: AppConfig) -> Result<()> {
    Server::new(config).await?.run().await
}
