//! Redis secret store
//!
//! Implements [`SecretStore`] on top of a shared, auto-reconnecting
//! [`ConnectionManager`]. Insert-if-absent maps to `SET NX`; compare-and-swap
//! runs as a Lua script so the comparison and the write happen in one step on
//! the server.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};
use tracing::{debug, error, info};

use super::{SecretStore, StoreError, StoreExpiry, StoreResult};

/// KEYS[1] key; ARGV[1] expected; ARGV[2] mode; ARGV[3] replacement; ARGV[4] ttl ms
const COMPARE_AND_SWAP_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[1])
if current == false or current ~= ARGV[1] then
  return 0
end
if ARGV[2] == 'delete' then
  redis.call('DEL', KEYS[1])
elseif ARGV[2] == 'persist' then
  redis.call('SET', KEYS[1], ARGV[3])
else
  redis.call('SET', KEYS[1], ARGV[3], 'PX', ARGV[4])
end
return 1
"#;

/// How a compare-and-swap leaves the key when it wins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SwapMode {
    Delete,
    Persist,
    Expire(u64),
}

impl SwapMode {
    fn new(replacement: Option<&[u8]>, expiry: StoreExpiry) -> Self {
        match (replacement, expiry.as_millis_ceil()) {
            (None, _) | (_, Some(0)) => SwapMode::Delete,
            (Some(_), None) => SwapMode::Persist,
            (Some(_), Some(millis)) => SwapMode::Expire(millis),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            SwapMode::Delete => "delete",
            SwapMode::Persist => "persist",
            SwapMode::Expire(_) => "expire",
        }
    }

    fn millis(&self) -> u64 {
        match self {
            SwapMode::Expire(millis) => *millis,
            _ => 0,
        }
    }
}

/// Redis-backed store
#[derive(Clone)]
pub struct RedisSecretStore {
    connection: ConnectionManager,
    namespace: Option<String>,
    cas_script: Arc<Script>,
}

impl fmt::Debug for RedisSecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisSecretStore").field("namespace", &self.namespace).finish_non_exhaustive()
    }
}

impl RedisSecretStore {
    /// Open a managed connection to the Redis server at `url`.
    pub async fn connect(url: &str, namespace: Option<String>) -> StoreResult<Self> {
        let client = Client::open(url).map_err(|e| StoreError::Unavailable {
            message: format!("Invalid Redis URL: {}", e),
            source: Some(Box::new(e)),
        })?;

        let connection = ConnectionManager::new(client).await.map_err(|e| {
            error!(error = %e, "Failed to connect to Redis");
            StoreError::from(e)
        })?;

        info!(namespace = ?namespace, "Connected to Redis");

        Ok(Self { connection, namespace, cas_script: Arc::new(Script::new(COMPARE_AND_SWAP_SCRIPT)) })
    }

    /// Physical key for a logical key
    fn namespaced_key(&self, key: &str) -> String {
        namespaced_key(self.namespace.as_deref(), key)
    }
}

fn namespaced_key(namespace: Option<&str>, key: &str) -> String {
    match namespace {
        Some(ns) => format!("{}:{}", ns, key),
        None => key.to_string(),
    }
}

#[async_trait]
impl SecretStore for RedisSecretStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let mut conn = self.connection.clone();
        let value: Option<Vec<u8>> = conn.get(self.namespaced_key(key)).await?;
        Ok(value)
    }

    async fn insert(&self, key: &str, value: &[u8], expiry: StoreExpiry) -> StoreResult<bool> {
        let ttl_millis = expiry.as_millis_ceil();
        if ttl_millis == Some(0) {
            debug!(key = %key, "Skipping write with immediate expiry");
            return Ok(true);
        }

        let mut cmd = redis::cmd("SET");
        cmd.arg(self.namespaced_key(key)).arg(value).arg("NX");
        if let Some(millis) = ttl_millis {
            cmd.arg("PX").arg(millis);
        }

        let mut conn = self.connection.clone();
        let reply: Option<String> = cmd.query_async(&mut conn).await?;
        Ok(reply.is_some())
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: &[u8],
        replacement: Option<&[u8]>,
        expiry: StoreExpiry,
    ) -> StoreResult<bool> {
        let mode = SwapMode::new(replacement, expiry);

        let mut conn = self.connection.clone();
        let swapped: i64 = self
            .cas_script
            .key(self.namespaced_key(key))
            .arg(expected)
            .arg(mode.as_str())
            .arg(replacement.unwrap_or_default())
            .arg(mode.millis())
            .invoke_async(&mut conn)
            .await?;

        Ok(swapped == 1)
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.connection.clone();
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        if reply != "PONG" {
            return Err(StoreError::backend(format!("Unexpected PING reply: {}", reply)));
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
