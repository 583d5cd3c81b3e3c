//! In-process cache store.
//!
//! A sorted map behind an `RwLock`. The BTreeMap ordering is what makes
//! prefix deletion cheap: `delete_prefix` walks only the contiguous range
//! of keys sharing the prefix instead of scanning the whole key set.
//!
//! Expiry is lazy at read time plus a periodic sweep
//! ([`spawn_sweep_task`]). No method suspends; the lock is only ever held
//! across synchronous map operations.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::store::CacheStore;

/// A stored value with its expiry timestamp.
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-process `CacheStore` backed by a sorted map.
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, CacheEntry>>,
    expirations: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            expirations: AtomicU64::new(0),
        }
    }

    /// Remove all expired entries. Returns the number removed.
    ///
    /// Called by the sweep task; reads already purge expired entries
    /// lazily, so this only bounds the memory held by keys nobody reads.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, entry| {
                if entry.is_expired(now) {
                    removed += 1;
                    false
                } else {
                    true
                }
            });
        }

        if removed > 0 {
            self.expirations
                .fetch_add(removed as u64, Ordering::Relaxed);
        }
        removed
    }

    /// Total entries expired so far (lazy reads plus sweeps).
    pub fn expirations(&self) -> u64 {
        self.expirations.load(Ordering::Relaxed)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let now = Instant::now();

        {
            let entries = self
                .entries
                .read()
                .map_err(|_| StoreError::backend("memory store lock poisoned"))?;
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => {
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {} // expired, purge below
                None => return Ok(None),
            }
        }

        // Expired entry: purge as a side effect of the read
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::backend("memory store lock poisoned"))?;
        if let Some(entry) = entries.get(key) {
            if entry.is_expired(Instant::now()) {
                entries.remove(key);
                self.expirations.fetch_add(1, Ordering::Relaxed);
            } else {
                // Concurrent writer refreshed the key between our locks
                return Ok(Some(entry.value.clone()));
            }
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> StoreResult<()> {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::backend("memory store lock poisoned"))?;
        entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::backend("memory store lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> StoreResult<u64> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::backend("memory store lock poisoned"))?;

        let matching: Vec<String> = entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &matching {
            entries.remove(key);
        }
        Ok(matching.len() as u64)
    }

    async fn entry_count(&self) -> StoreResult<u64> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::backend("memory store lock poisoned"))?;
        Ok(entries.len() as u64)
    }

    fn backend_kind(&self) -> &'static str {
        "memory"
    }
}

/// Spawn a background task that periodically sweeps expired entries.
pub fn spawn_sweep_task(store: Arc<MemoryStore>, interval: Duration) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            let removed = store.sweep_expired();
            if removed > 0 {
                debug!(removed = removed, "swept expired cache entries");
            }
        }
    });

    debug!(
        interval_secs = interval.as_secs(),
        "cache sweep task started"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new();
        store
            .set("k1", "v1".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.get("k1").await.unwrap(), Some("v1".to_string()));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_purged_on_read() {
        let store = MemoryStore::new();
        store
            .set("k1", "v1".to_string(), Duration::from_millis(10))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(store.get("k1").await.unwrap(), None);
        // Physically gone, not just hidden
        assert_eq!(store.entry_count().await.unwrap(), 0);
        assert_eq!(store.expirations(), 1);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = MemoryStore::new();
        store
            .set("k1", "old".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        store
            .set("k1", "new".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.get("k1").await.unwrap(), Some("new".to_string()));
        assert_eq!(store.entry_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        store
            .set("k1", "v1".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        assert!(store.delete("k1").await.is_ok());
        assert!(store.delete("k1").await.is_ok());
        assert_eq!(store.get("k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_prefix_only_removes_matching_range() {
        let store = MemoryStore::new();
        for key in ["class:list:a", "class:list:b", "class:data:1", "other:x"] {
            store
                .set(key, "v".to_string(), Duration::from_secs(60))
                .await
                .unwrap();
        }

        let removed = store.delete_prefix("class:list:").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.get("class:list:a").await.unwrap(), None);
        assert_eq!(store.get("class:list:b").await.unwrap(), None);
        assert!(store.get("class:data:1").await.unwrap().is_some());
        assert!(store.get("other:x").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sweep_expired() {
        let store = MemoryStore::new();
        store
            .set("short", "v".to_string(), Duration::from_millis(10))
            .await
            .unwrap();
        store
            .set("long", "v".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(store.sweep_expired(), 1);
        assert_eq!(store.entry_count().await.unwrap(), 1);
        assert!(store.get("long").await.unwrap().is_some());
    }
}
