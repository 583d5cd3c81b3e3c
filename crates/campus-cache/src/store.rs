//! Backing-store abstraction.
//!
//! The store is selected once at startup and never branched on per call:
//! [`crate::KeyedCache`] holds an `Arc<dyn CacheStore>` and every consumer
//! goes through it. Two implementations exist:
//!
//! - [`crate::MemoryStore`] - in-process sorted map, never suspends
//! - [`crate::RedisStore`] - shared Redis via a `deadpool-redis` pool
//!
//! Store methods return [`StoreError`] so implementations can report what
//! actually went wrong; the error handling policy (log and degrade to a
//! miss) lives one layer up in `KeyedCache`, not here.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreResult;

/// A TTL-expiring key/value store with prefix-based bulk deletion.
///
/// Values are pre-serialized strings; the store owns no knowledge of what
/// they contain. All operations must be idempotent: overwriting an existing
/// key and deleting an absent key both succeed.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a value. Expired entries are treated as absent; an
    /// implementation with no native expiry must purge them on read.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store a value with an expiry of `now + ttl`, overwriting any prior
    /// entry under the key.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> StoreResult<()>;

    /// Remove one entry. Deleting an absent key is a success.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Remove every entry whose key starts with `prefix` (the caller has
    /// already stripped the trailing `*` from the glob). Returns the number
    /// of entries removed.
    async fn delete_prefix(&self, prefix: &str) -> StoreResult<u64>;

    /// Approximate number of entries currently held.
    async fn entry_count(&self) -> StoreResult<u64>;

    /// Short backend identifier for stats and health reporting.
    fn backend_kind(&self) -> &'static str;
}
