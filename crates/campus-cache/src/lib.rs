//! Application-level cache layer for the Campus backend.
//!
//! ## Architecture
//!
//! ```text
//! controllers ──► ClassCache (class: namespace, per-view TTLs,
//!                 invalidation protocol)
//!                     │
//!                 KeyedCache (JSON serialization, failure isolation,
//!                 hit/miss stats, health probe)
//!                     │
//!                 CacheStore ── MemoryStore (in-process sorted map)
//!                           └── RedisStore  (shared, deadpool pool)
//! ```
//!
//! ## Graceful degradation
//!
//! The backend is selected once at startup. If Redis is disabled or
//! unreachable the system still starts against the in-process store, and
//! every runtime backend failure degrades to a cache miss - cache problems
//! cost latency, never correctness. The data store remains the sole source
//! of truth; every cached entry is a rebuildable projection.

pub mod class;
pub mod config;
pub mod error;
pub mod keyed;
pub mod keys;
pub mod memory;
pub mod redis;
pub mod store;

pub use class::ClassCache;
pub use config::{CacheSettings, RedisConfig, TtlConfig};
pub use error::{StoreError, StoreResult};
pub use keyed::{HealthReport, KeyedCache, KeyedCacheStats};
pub use keys::{NAMESPACE, View, canonical_params, dimension_discriminator};
pub use memory::{MemoryStore, spawn_sweep_task};
pub use self::redis::RedisStore;
pub use store::CacheStore;
