//! In-memory secret store
//!
//! Process-local implementation of [`SecretStore`] for development and
//! tests. Expiry is checked lazily on every access; [`purge_expired`]
//! reclaims memory held by dead entries, and [`spawn_purge_task`] runs it on
//! a timer for as long as the store is alive.
//!
//! [`purge_expired`]: InMemorySecretStore::purge_expired
//! [`spawn_purge_task`]: InMemorySecretStore::spawn_purge_task

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use super::{SecretStore, StoreExpiry, StoreResult};

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    deadline: Option<Instant>,
}

impl Entry {
    fn new(value: &[u8], expiry: StoreExpiry) -> Self {
        let deadline = match expiry {
            StoreExpiry::Never => None,
            StoreExpiry::After(ttl) => Some(Instant::now() + ttl),
        };
        Self { value: value.to_vec(), deadline }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.deadline.map_or(true, |deadline| now < deadline)
    }
}

/// Map-backed store guarded by a single async lock
#[derive(Debug, Clone, Default)]
pub struct InMemorySecretStore {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, including expired ones not yet purged
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Drop every expired entry and return how many were removed
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.inner.write().await;
        let now = Instant::now();
        let before = entries.len();

        entries.retain(|key, entry| {
            let live = entry.is_live(now);
            if !live {
                debug!(key = %key, "Removing expired entry");
            }
            live
        });

        before - entries.len()
    }

    /// Purge expired entries every `period` until every clone of this store
    /// has been dropped.
    pub fn spawn_purge_task(&self, period: Duration) -> JoinHandle<()> {
        let entries = Arc::downgrade(&self.inner);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let Some(inner) = entries.upgrade() else {
                    debug!("In-memory store dropped, stopping purge task");
                    break;
                };

                let removed = InMemorySecretStore { inner }.purge_expired().await;
                if removed > 0 {
                    debug!(removed, "Purged expired secrets");
                }
            }
        })
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let entries = self.inner.read().await;
        let now = Instant::now();

        Ok(entries.get(key).filter(|entry| entry.is_live(now)).map(|entry| entry.value.clone()))
    }

    async fn insert(&self, key: &str, value: &[u8], expiry: StoreExpiry) -> StoreResult<bool> {
        if expiry.is_immediate() {
            return Ok(true);
        }

        let mut entries = self.inner.write().await;
        let now = Instant::now();

        if entries.get(key).is_some_and(|entry| entry.is_live(now)) {
            return Ok(false);
        }

        entries.insert(key.to_string(), Entry::new(value, expiry));
        Ok(true)
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: &[u8],
        replacement: Option<&[u8]>,
        expiry: StoreExpiry,
    ) -> StoreResult<bool> {
        let mut entries = self.inner.write().await;
        let now = Instant::now();

        let matches = entries
            .get(key)
            .is_some_and(|entry| entry.is_live(now) && entry.value.as_slice() == expected);
        if !matches {
            return Ok(false);
        }

        match replacement {
            Some(value) if !expiry.is_immediate() => {
                entries.insert(key.to_string(), Entry::new(value, expiry));
            }
            _ => {
                entries.remove(key);
            }
        }

        Ok(true)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
