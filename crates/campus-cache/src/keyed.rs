//! Generic keyed cache over a pluggable backing store.
//!
//! `KeyedCache` owns the two policies every consumer relies on:
//!
//! - **Serialization**: values go in and out as JSON strings.
//! - **Failure isolation**: no operation ever returns an error. Backend
//!   and serialization failures are logged and reported as a miss
//!   (`None`) or a not-stored/not-deleted result (`false`), so a broken
//!   cache degrades to cold-cache latency instead of failed requests.
//!
//! The store is chosen once at startup by [`KeyedCache::connect`]; there is
//! no per-call backend branching and no dual-write.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::CacheSettings;
use crate::memory::{MemoryStore, spawn_sweep_task};
use crate::redis::RedisStore;
use crate::store::CacheStore;

/// TTL for the health-check sentinel key.
const SENTINEL_TTL: Duration = Duration::from_secs(10);

/// Shared keyed cache handle. Cheap to clone.
#[derive(Clone)]
pub struct KeyedCache {
    store: Arc<dyn CacheStore>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl KeyedCache {
    /// Select and connect the backing store from configuration.
    ///
    /// Redis is used when enabled and reachable; any pool or connection
    /// failure logs a warning and falls back to the in-process store. The
    /// cache never prevents the process from starting.
    pub async fn connect(settings: &CacheSettings) -> Self {
        if settings.redis.enabled {
            info!(url = %settings.redis.url, "connecting cache to Redis");
            match RedisStore::connect(&settings.redis).await {
                Ok(store) => {
                    info!("cache connected to Redis");
                    return Self::with_store(Arc::new(store));
                }
                Err(e) => {
                    warn!(error = %e, "Redis unavailable, falling back to in-process cache");
                }
            }
        } else {
            info!("Redis disabled, using in-process cache");
        }

        let store = Arc::new(MemoryStore::new());
        spawn_sweep_task(Arc::clone(&store), settings.sweep_interval());
        Self::with_store(store)
    }

    /// Wrap an already-constructed store.
    pub fn with_store(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// In-process cache with no sweep task, for tests and single-shot tools.
    pub fn in_process() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// Fetch and deserialize a cached value.
    ///
    /// Misses, expiry, backend errors and deserialization failures all
    /// yield `None`. An entry that no longer deserializes is deleted as a
    /// side effect so it cannot poison later reads.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %key, "cache hit");
                    Some(value)
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "failed to deserialize cached value, evicting");
                    let _ = self.store.delete(key).await;
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    None
                }
            },
            Ok(None) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "cache miss");
                None
            }
            Err(e) => {
                warn!(key = %key, error = %e, "cache get failed");
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Serialize and store a value with the given TTL.
    ///
    /// Returns whether the value was stored; `false` means "not cached",
    /// never an error the caller must handle.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "failed to serialize value for cache");
                return false;
            }
        };

        match self.store.set(key, raw, ttl).await {
            Ok(()) => {
                debug!(key = %key, ttl_secs = ttl.as_secs(), "cache set");
                true
            }
            Err(e) => {
                warn!(key = %key, error = %e, "cache set failed");
                false
            }
        }
    }

    /// Remove one entry. Idempotent: deleting an absent key succeeds.
    pub async fn delete(&self, key: &str) -> bool {
        match self.store.delete(key).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "cache delete failed");
                false
            }
        }
    }

    /// Remove every entry matching a `prefix*` glob.
    pub async fn delete_pattern(&self, pattern: &str) -> bool {
        let prefix = pattern.strip_suffix('*').unwrap_or(pattern);
        match self.store.delete_prefix(prefix).await {
            Ok(removed) => {
                debug!(pattern = %pattern, removed = removed, "cache pattern delete");
                true
            }
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "cache pattern delete failed");
                false
            }
        }
    }

    /// Administrative flush of an entire namespace (e.g. `class`).
    pub async fn clear(&self, namespace: &str) -> bool {
        self.delete_pattern(&format!("{namespace}:*")).await
    }

    /// Verify the cache is operational without touching any domain key:
    /// write a sentinel, read it back, delete it.
    pub async fn health_check(&self) -> HealthReport {
        let key = format!("health:check:{}", Uuid::new_v4());
        let sentinel = "ok";

        let write_ok = self.set(&key, &sentinel, SENTINEL_TTL).await;
        let read_ok = self
            .get::<String>(&key)
            .await
            .is_some_and(|value| value == sentinel);
        let delete_ok = self.delete(&key).await;

        HealthReport {
            backend: self.store.backend_kind(),
            write_ok,
            read_ok,
            delete_ok,
        }
    }

    /// Backend type, approximate entry count, and hit/miss counters.
    pub async fn stats(&self) -> KeyedCacheStats {
        let entries = match self.store.entry_count().await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "cache entry count failed");
                0
            }
        };
        KeyedCacheStats {
            backend: self.store.backend_kind(),
            entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Result of a sentinel write/read/delete health probe.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthReport {
    pub backend: &'static str,
    pub write_ok: bool,
    pub read_ok: bool,
    pub delete_ok: bool,
}

impl HealthReport {
    /// All three probe steps succeeded.
    pub fn healthy(&self) -> bool {
        self.write_ok && self.read_ok && self.delete_ok
    }
}

/// Cache statistics for the admin surface.
#[derive(Debug, Clone, serde::Serialize)]
pub struct KeyedCacheStats {
    pub backend: &'static str,
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
}

impl KeyedCacheStats {
    /// Hit rate as a percentage.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_round_trip() {
        let cache = KeyedCache::in_process();
        assert!(cache.set("k", &vec![1, 2, 3], Duration::from_secs(60)).await);

        let value: Option<Vec<i32>> = cache.get("k").await;
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_get_wrong_type_evicts_entry() {
        let cache = KeyedCache::in_process();
        assert!(cache.set("k", &"text", Duration::from_secs(60)).await);

        // Cached value is a JSON string; asking for a map fails and evicts
        let bad: Option<std::collections::HashMap<String, u32>> = cache.get("k").await;
        assert!(bad.is_none());

        let gone: Option<String> = cache.get("k").await;
        assert!(gone.is_none());
    }

    #[tokio::test]
    async fn test_clear_namespace() {
        let cache = KeyedCache::in_process();
        cache.set("class:list:a", &1, Duration::from_secs(60)).await;
        cache.set("class:data:1", &2, Duration::from_secs(60)).await;
        cache.set("driver:data:1", &3, Duration::from_secs(60)).await;

        assert!(cache.clear("class").await);

        assert_eq!(cache.get::<i32>("class:list:a").await, None);
        assert_eq!(cache.get::<i32>("class:data:1").await, None);
        assert_eq!(cache.get::<i32>("driver:data:1").await, Some(3));
    }

    #[tokio::test]
    async fn test_stats_counters() {
        let cache = KeyedCache::in_process();
        cache.set("k", &1, Duration::from_secs(60)).await;

        let _: Option<i32> = cache.get("k").await;
        let _: Option<i32> = cache.get("absent").await;

        let stats = cache.stats().await;
        assert_eq!(stats.backend, "memory");
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 50.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_health_check() {
        let cache = KeyedCache::in_process();
        let report = cache.health_check().await;

        assert!(report.healthy());
        assert_eq!(report.backend, "memory");
        // The sentinel must not linger
        let stats = cache.stats().await;
        assert_eq!(stats.entries, 0);
    }
}
