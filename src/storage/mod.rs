//! # Storage
//!
//! The key-value contract the secret lifecycle is written against, plus its
//! Redis and in-memory implementations.
//!
//! The lifecycle needs three primitives from a backend:
//!
//! - **get**: raw bytes for a key, or a miss
//! - **insert**: write only if the key is absent (no silent overwrite of a
//!   colliding handle)
//! - **compare_and_swap**: replace or delete a value only if it still equals
//!   the bytes previously read, so concurrent readers cannot both spend the
//!   same view
//!
//! Every write carries a [`StoreExpiry`]. A zero duration is immediate expiry;
//! it is never interpreted as "no TTL".

pub mod error;
pub mod memory;
pub mod pool;
pub mod redis_store;

pub use error::{StoreError, StoreResult};
pub use memory::InMemorySecretStore;
pub use pool::{create_memory_store, create_store};
pub use redis_store::RedisSecretStore;

use async_trait::async_trait;
use std::time::Duration;

/// Expiry attached to a store write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreExpiry {
    /// Keep until deleted or evicted
    Never,
    /// Expire after the given duration; zero means immediately
    After(Duration),
}

impl StoreExpiry {
    /// A write with this expiry would be dead on arrival.
    pub fn is_immediate(&self) -> bool {
        matches!(self, StoreExpiry::After(ttl) if ttl.is_zero())
    }

    /// Duration in whole milliseconds, rounded up so that a positive
    /// sub-millisecond TTL does not collapse to zero.
    pub fn as_millis_ceil(&self) -> Option<u64> {
        match self {
            StoreExpiry::Never => None,
            StoreExpiry::After(ttl) => {
                let millis = ttl.as_millis();
                let rounded = if ttl.subsec_nanos() % 1_000_000 != 0 { millis + 1 } else { millis };
                Some(u64::try_from(rounded).unwrap_or(u64::MAX))
            }
        }
    }
}

/// Contract over a key-value backend holding serialized secrets
///
/// Implementations must be safe for concurrent use from many request tasks.
#[async_trait]
pub trait SecretStore: Send + Sync + std::fmt::Debug {
    /// Fetch the value stored under `key`; `Ok(None)` on a miss.
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Store `value` under `key` unless the key already holds a live value.
    ///
    /// Returns `Ok(false)` when the key is taken. An immediate expiry stores
    /// nothing and reports success.
    async fn insert(&self, key: &str, value: &[u8], expiry: StoreExpiry) -> StoreResult<bool>;

    /// Atomically replace the value under `key` if it still equals `expected`.
    ///
    /// A `replacement` of `None`, or an immediate `expiry`, deletes the key.
    /// Returns `Ok(false)` if the key is missing or holds different bytes.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: &[u8],
        replacement: Option<&[u8]>,
        expiry: StoreExpiry,
    ) -> StoreResult<bool>;

    /// Round-trip to the backend to confirm it is reachable.
    async fn ping(&self) -> StoreResult<()>;

    /// Short backend identifier for logs and health output.
    fn backend_name(&self) -> &'static str;
}
