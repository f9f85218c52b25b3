//! Secret lifecycle engine
//!
//! Creates secrets under fresh handles and consumes them one view at a time.
//! All shared state lives in the store; the engine only holds configuration
//! and handles to its collaborators, so one instance serves every request.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, instrument, warn, Instrument};

use super::{LifecycleError, LifecycleObserver, LifecycleResult, NoopObserver};
use crate::config::LifecycleConfig;
use crate::domain::{HandleGenerator, RandomHandleGenerator, Secret};
use crate::storage::{SecretStore, StoreError, StoreExpiry, StoreResult};

pub const FIELD_SECRET: &str = "secret";
pub const FIELD_VIEWS: &str = "expireAfterViews";
pub const FIELD_TTL: &str = "expireAfter";

/// Orchestrates create and consume against a [`SecretStore`]
#[derive(Debug, Clone)]
pub struct SecretLifecycle {
    store: Arc<dyn SecretStore>,
    handles: Arc<dyn HandleGenerator>,
    observer: Arc<dyn LifecycleObserver>,
    config: LifecycleConfig,
    operation_timeout: StdDuration,
}

impl SecretLifecycle {
    /// Engine with random handles and no observer.
    pub fn new(
        store: Arc<dyn SecretStore>,
        config: LifecycleConfig,
        operation_timeout: StdDuration,
    ) -> Self {
        Self {
            store,
            handles: Arc::new(RandomHandleGenerator::new(config.handle_length)),
            observer: Arc::new(NoopObserver),
            config,
            operation_timeout,
        }
    }

    pub fn with_handle_generator(mut self, handles: Arc<dyn HandleGenerator>) -> Self {
        self.handles = handles;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn store(&self) -> &Arc<dyn SecretStore> {
        &self.store
    }

    /// Probe the store under the usual operation timeout.
    pub async fn ping(&self) -> LifecycleResult<()> {
        self.timed("ping", self.store.ping()).await
    }

    /// Store a new secret readable `remaining_views` times for `ttl`.
    ///
    /// A zero `ttl` expires the secret immediately: nothing is written and
    /// every later consume reports it as not found.
    #[instrument(skip(self, text), fields(handle = tracing::field::Empty))]
    pub async fn create(
        &self,
        text: &str,
        remaining_views: i64,
        ttl: Duration,
    ) -> LifecycleResult<Secret> {
        let result = self.try_create(text, remaining_views, ttl).await;

        match &result {
            Ok(secret) => {
                tracing::Span::current().record("handle", secret.handle.as_str());
                info!(
                    handle = %secret.handle,
                    remaining_views = secret.remaining_views,
                    expires_at = %secret.expires_at,
                    "Secret created"
                );
                self.observer.on_created(secret);
            }
            Err(err) => self.reject("create", err),
        }

        result
    }

    /// Spend one view of the secret stored under `handle`.
    ///
    /// The returned secret carries the remaining count after this read.
    #[instrument(skip(self))]
    pub async fn consume(&self, handle: &str) -> LifecycleResult<Secret> {
        let result = self.try_consume(handle).await;

        match &result {
            Ok(secret) => {
                info!(
                    handle = %secret.handle,
                    remaining_views = secret.remaining_views,
                    "Secret consumed"
                );
                self.observer.on_consumed(secret);
            }
            Err(err) => self.reject("consume", err),
        }

        result
    }

    async fn try_create(
        &self,
        text: &str,
        remaining_views: i64,
        ttl: Duration,
    ) -> LifecycleResult<Secret> {
        let remaining_views = self.validate_views(remaining_views)?;
        if text.is_empty() {
            return Err(LifecycleError::validation(FIELD_SECRET, "must not be empty"));
        }
        let store_ttl = ttl
            .to_std()
            .map_err(|_| LifecycleError::validation(FIELD_TTL, "must not be negative"))?;

        let now = Utc::now();
        if now.checked_add_signed(ttl).is_none() {
            return Err(LifecycleError::validation(FIELD_TTL, "is too large"));
        }

        for attempt in 1..=self.config.max_handle_attempts {
            let secret = Secret::new(self.handles.generate(), text, remaining_views, ttl, now);
            let bytes = secret
                .to_bytes()
                .map_err(|e| LifecycleError::storage_with_source("failed to encode secret", e))?;

            let stored = self
                .timed("insert", self.store.insert(&secret.handle, &bytes, StoreExpiry::After(store_ttl)))
                .await?;
            if stored {
                return Ok(secret);
            }

            warn!(attempt, "Generated handle already in use, drawing another");
        }

        Err(LifecycleError::storage(format!(
            "no free handle after {} attempts",
            self.config.max_handle_attempts
        )))
    }

    async fn try_consume(&self, handle: &str) -> LifecycleResult<Secret> {
        for attempt in 1..=self.config.max_consume_attempts {
            let raw = self
                .timed("get", self.store.get(handle))
                .await?
                .ok_or_else(|| LifecycleError::not_found(handle))?;

            let current = Secret::from_bytes(&raw).map_err(|e| {
                LifecycleError::storage_with_source("stored secret could not be decoded", e)
            })?;

            let now = Utc::now();
            let next = spend_view(&current, now).ok_or_else(|| LifecycleError::not_found(handle))?;

            let (replacement, expiry) = if next.is_exhausted() {
                (None, StoreExpiry::Never)
            } else {
                let bytes = next
                    .to_bytes()
                    .map_err(|e| LifecycleError::storage_with_source("failed to encode secret", e))?;
                (Some(bytes), next.store_expiry(now))
            };

            let swapped = self
                .timed(
                    "compare_and_swap",
                    self.store.compare_and_swap(handle, &raw, replacement.as_deref(), expiry),
                )
                .await?;
            if swapped {
                return Ok(next);
            }

            debug!(attempt, "Secret changed while being consumed, retrying");
            self.observer.on_consume_conflict(handle);
        }

        Err(LifecycleError::storage(format!(
            "secret still contended after {} attempts",
            self.config.max_consume_attempts
        )))
    }

    fn validate_views(&self, remaining_views: i64) -> LifecycleResult<u32> {
        if remaining_views < 1 {
            return Err(LifecycleError::validation(FIELD_VIEWS, "must be at least 1"));
        }

        let views = u32::try_from(remaining_views)
            .map_err(|_| LifecycleError::validation(FIELD_VIEWS, "is too large"))?;

        match self.config.max_views {
            Some(max) if views > max => {
                Err(LifecycleError::validation(FIELD_VIEWS, format!("must be at most {}", max)))
            }
            _ => Ok(views),
        }
    }

    async fn timed<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = StoreResult<T>>,
    ) -> LifecycleResult<T> {
        let span = crate::store_span!(operation, self.store.backend_name());
        match tokio::time::timeout(self.operation_timeout, call.instrument(span)).await {
            Ok(result) => result.map_err(LifecycleError::from),
            Err(_) => {
                let millis = u64::try_from(self.operation_timeout.as_millis()).unwrap_or(u64::MAX);
                Err(StoreError::timeout(operation, millis).into())
            }
        }
    }

    fn reject(&self, operation: &'static str, err: &LifecycleError) {
        match err {
            LifecycleError::NotFound { .. } => debug!(operation, "Secret not found"),
            LifecycleError::Validation { field, message } => {
                warn!(operation, field = *field, message = %message, "Rejected invalid request")
            }
            LifecycleError::Storage { .. } => {
                let cause = std::error::Error::source(err).map(ToString::to_string);
                error!(operation, error = %err, cause = ?cause, "Secret operation failed")
            }
        }
        self.observer.on_rejected(operation, err);
    }
}

/// The record that replaces `current` after one read at `now`, or `None` if
/// `current` may no longer be read.
fn spend_view(current: &Secret, now: DateTime<Utc>) -> Option<Secret> {
    if !current.is_readable(now) {
        return None;
    }
    current.with_view_spent()
}
