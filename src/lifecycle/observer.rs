//! Lifecycle event hooks.
//!
//! The engine reports each completed operation to an injected
//! [`LifecycleObserver`] instead of touching global registries. The metrics
//! implementation lives in [`crate::observability::metrics`].

use std::fmt;

use super::LifecycleError;
use crate::domain::Secret;

/// Receiver of lifecycle events
///
/// Callbacks run inline on the request task and must not block.
pub trait LifecycleObserver: Send + Sync + fmt::Debug {
    /// A secret was written to the store.
    fn on_created(&self, secret: &Secret);

    /// A view was spent; `secret` carries the new remaining count.
    fn on_consumed(&self, secret: &Secret);

    /// An operation failed with `error`.
    fn on_rejected(&self, operation: &'static str, error: &LifecycleError);

    /// A compare-and-swap lost to a concurrent writer and will be retried.
    fn on_consume_conflict(&self, _handle: &str) {}
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl LifecycleObserver for NoopObserver {
    fn on_created(&self, _secret: &Secret) {}

    fn on_consumed(&self, _secret: &Secret) {}

    fn on_rejected(&self, _operation: &'static str, _error: &LifecycleError) {}
}
