//! Redis cache store.
//!
//! Shared backend for multi-instance deployments. Expiry is native
//! (`SET ... EX`), prefix deletion uses `SCAN MATCH` with batched `DEL`
//! (never the blocking `KEYS`), and every call is bounded by the pool's
//! connection timeouts, so a hung Redis degrades to the store-error path
//! instead of stalling request handling.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Pool, Runtime};
use ::redis::AsyncCommands;
use tracing::debug;

use crate::config::RedisConfig;
use crate::error::{StoreError, StoreResult};
use crate::store::CacheStore;

/// Maximum keys per DEL when bulk-deleting a scanned prefix.
const DELETE_BATCH_SIZE: usize = 512;

/// Redis-backed `CacheStore` over a deadpool connection pool.
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    /// Build a pool from configuration and verify the connection with a
    /// PING. Any failure is returned so the caller can fall back to the
    /// in-process store.
    pub async fn connect(config: &RedisConfig) -> StoreResult<Self> {
        let mut pool_config = deadpool_redis::Config::from_url(&config.url);
        let pool_settings = pool_config
            .pool
            .get_or_insert_with(deadpool_redis::PoolConfig::default);
        pool_settings.max_size = config.pool_size;
        pool_settings.timeouts.wait = Some(Duration::from_millis(config.timeout_ms));
        pool_settings.timeouts.create = Some(Duration::from_millis(config.timeout_ms));
        pool_settings.timeouts.recycle = Some(Duration::from_millis(config.timeout_ms));

        let pool = pool_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::pool(e.to_string()))?;

        let mut conn = pool.get().await.map_err(|e| StoreError::pool(e.to_string()))?;
        ::redis::cmd("PING")
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool (used when the host app owns pool creation).
    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    async fn connection(&self) -> StoreResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::pool(e.to_string()))
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| StoreError::backend(e.to_string()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        // EX takes whole seconds; round sub-second TTLs up rather than to 0
        let ttl_secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e| StoreError::backend(e.to_string()))
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| StoreError::backend(e.to_string()))
    }

    async fn delete_prefix(&self, prefix: &str) -> StoreResult<u64> {
        let mut conn = self.connection().await?;

        let matching: Vec<String> = {
            let mut iter = conn
                .scan_match::<_, String>(format!("{prefix}*"))
                .await
                .map_err(|e| StoreError::backend(e.to_string()))?;
            let mut keys = Vec::new();
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
            keys
        };

        if matching.is_empty() {
            return Ok(0);
        }

        let mut removed = 0u64;
        for batch in matching.chunks(DELETE_BATCH_SIZE) {
            let count: u64 = conn
                .del(batch)
                .await
                .map_err(|e| StoreError::backend(e.to_string()))?;
            removed += count;
        }

        debug!(prefix = %prefix, removed = removed, "deleted keys by prefix");
        Ok(removed)
    }

    async fn entry_count(&self) -> StoreResult<u64> {
        let mut conn = self.connection().await?;
        ::redis::cmd("DBSIZE")
            .query_async::<u64>(&mut conn)
            .await
            .map_err(|e| StoreError::backend(e.to_string()))
    }

    fn backend_kind(&self) -> &'static str {
        "redis"
    }
}
