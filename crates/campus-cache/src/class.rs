//! Class cache facade and invalidation protocol.
//!
//! Wraps [`KeyedCache`] with the `class:` key space: one get/set/delete
//! triple per view plus the four invalidation entry points controllers
//! call after every committed mutation. The facade is pure caching - it
//! never queries the data store. Controllers do the read-through
//! sequencing themselves:
//!
//! ```ignore
//! let discriminator = canonical_params(params.to_pairs());
//! if let Some(page) = classes.get_view::<Page<ClassDto>>(View::List, &discriminator).await {
//!     return Ok(page);
//! }
//! let page = repo.list_classes(&params).await?;
//! classes.set_view(View::List, &discriminator, &page).await;
//! ```
//!
//! ## Invalidation policy
//!
//! Delete broadly, rebuild lazily. A false miss costs one extra data-store
//! query; a false hit serves wrong data. Every mutation therefore retires
//! all collection views, and updates additionally retire the dimension
//! entries of both the old and the new dimension values so an entity moving
//! between schools/levels/teachers leaves no stale listing behind.

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, join_all};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use campus_core::ClassSnapshot;

use crate::config::TtlConfig;
use crate::keyed::{HealthReport, KeyedCache, KeyedCacheStats};
use crate::keys::{NAMESPACE, View, namespace_pattern};

/// Views holding cached collections; any mutation can make these stale.
const COLLECTION_VIEWS: [View; 4] = [View::List, View::Search, View::Counts, View::Export];

/// Views aggregating over many entities; retired on update/delete only.
const AGGREGATE_VIEWS: [View; 2] = [View::Analytics, View::Performance];

/// Dimension index views, paired with their snapshot field below.
const DIMENSION_VIEWS: [View; 3] = [View::School, View::Level, View::Teacher];

fn dimension_value(class: &ClassSnapshot, view: View) -> Option<&str> {
    match view {
        View::School => class.school_id.as_deref(),
        View::Level => class.level.as_deref(),
        View::Teacher => class.teacher_id.as_deref(),
        _ => None,
    }
}

/// Domain cache for the class entity.
#[derive(Clone)]
pub struct ClassCache {
    cache: KeyedCache,
    ttl: TtlConfig,
}

impl ClassCache {
    /// Wrap a keyed cache with the default per-view TTL table.
    pub fn new(cache: KeyedCache) -> Self {
        Self::with_ttl(cache, TtlConfig::default())
    }

    /// Wrap a keyed cache with deployment-specific TTL overrides.
    pub fn with_ttl(cache: KeyedCache, ttl: TtlConfig) -> Self {
        Self { cache, ttl }
    }

    /// Access the underlying keyed cache (admin surface).
    pub fn inner(&self) -> &KeyedCache {
        &self.cache
    }

    // ========================================================================
    // Per-view accessors
    // ========================================================================

    /// Fetch a cached value for a view. `None` on miss, expiry, or any
    /// backend failure.
    pub async fn get_view<T: DeserializeOwned>(&self, view: View, discriminator: &str) -> Option<T> {
        self.cache.get(&view.key(discriminator)).await
    }

    /// Cache a value under a view with that view's TTL.
    pub async fn set_view<T: Serialize>(&self, view: View, discriminator: &str, value: &T) -> bool {
        self.cache
            .set(&view.key(discriminator), value, self.ttl.for_view(view))
            .await
    }

    /// Remove one entry of a view.
    pub async fn delete_view(&self, view: View, discriminator: &str) -> bool {
        self.cache.delete(&view.key(discriminator)).await
    }

    /// Remove every entry of a view.
    pub async fn delete_view_pattern(&self, view: View) -> bool {
        self.cache.delete_pattern(&view.pattern()).await
    }

    /// Fetch a single class by id (`class:data:{id}`).
    pub async fn get_class<T: DeserializeOwned>(&self, id: &str) -> Option<T> {
        self.get_view(View::Data, id).await
    }

    /// Cache a single class by id.
    pub async fn set_class<T: Serialize>(&self, id: &str, value: &T) -> bool {
        self.set_view(View::Data, id, value).await
    }

    /// Remove a single class entry.
    pub async fn delete_class(&self, id: &str) -> bool {
        self.delete_view(View::Data, id).await
    }

    // ========================================================================
    // Invalidation protocol
    // ========================================================================

    /// Invalidate after a create commits.
    ///
    /// Every cached collection could now be missing the new member, and the
    /// per-dimension listings for the entity's dimension values are
    /// incomplete.
    pub async fn on_create(&self, class: &ClassSnapshot) -> bool {
        let mut patterns = collection_patterns();
        patterns.extend(dimension_patterns(class));
        self.fan_out(Vec::new(), patterns, "create").await
    }

    /// Invalidate after an update commits.
    ///
    /// `old` is the entity state before the write. When a dimension value
    /// changed, the old value's entries are retired as well - new-value
    /// invalidation alone would leave a stale listing under the old school,
    /// level or teacher.
    pub async fn on_update(&self, new: &ClassSnapshot, old: &ClassSnapshot) -> bool {
        let keys = vec![View::Data.key(&new.id)];

        let mut patterns = collection_patterns();
        patterns.extend(AGGREGATE_VIEWS.iter().map(|view| view.pattern()));
        patterns.extend(dimension_patterns(new));
        for view in DIMENSION_VIEWS {
            let old_value = dimension_value(old, view);
            if let Some(value) = old_value {
                if old_value != dimension_value(new, view) {
                    patterns.push(view.dimension_pattern(value));
                }
            }
        }

        self.fan_out(keys, patterns, "update").await
    }

    /// Invalidate after a delete commits, using the entity's last-known
    /// state.
    pub async fn on_delete(&self, class: &ClassSnapshot) -> bool {
        let keys = vec![View::Data.key(&class.id)];

        let mut patterns = collection_patterns();
        patterns.extend(AGGREGATE_VIEWS.iter().map(|view| view.pattern()));
        patterns.extend(dimension_patterns(class));

        self.fan_out(keys, patterns, "delete").await
    }

    /// Invalidate after a bulk mutation commits.
    ///
    /// Bulk operations touch too many dimension combinations for selective
    /// invalidation to pay off: flush the whole namespace, then retire the
    /// per-id entries of every affected class. The cost is a wave of cache
    /// misses, never staleness.
    pub async fn on_bulk_operation(&self, affected_ids: &[String]) -> bool {
        let flush_ok = self.cache.delete_pattern(&namespace_pattern()).await;

        let keys: Vec<String> = affected_ids
            .iter()
            .flat_map(|id| [View::Data.key(id), View::Counts.key(id)])
            .collect();
        let ids_ok = self.fan_out(keys, Vec::new(), "bulk").await;

        flush_ok && ids_ok
    }

    /// Administrative flush of the whole `class:*` namespace.
    pub async fn clear(&self) -> bool {
        self.cache.clear(NAMESPACE).await
    }

    /// Sentinel-based health probe of the backing store.
    pub async fn health_check(&self) -> HealthReport {
        self.cache.health_check().await
    }

    /// Backend type, entry count and hit/miss counters.
    pub async fn stats(&self) -> KeyedCacheStats {
        self.cache.stats().await
    }

    /// Issue all deletes for one invalidation trigger concurrently.
    ///
    /// A failed delete never blocks its siblings; the trigger reports
    /// success only if every delete succeeded. The mutation has already
    /// committed either way, so callers log and proceed on `false`.
    async fn fan_out(&self, keys: Vec<String>, patterns: Vec<String>, trigger: &str) -> bool {
        let mut tasks: Vec<BoxFuture<'_, bool>> = Vec::new();
        for key in keys {
            tasks.push(async move { self.cache.delete(&key).await }.boxed());
        }
        for pattern in patterns {
            tasks.push(async move { self.cache.delete_pattern(&pattern).await }.boxed());
        }

        let results = join_all(tasks).await;
        let failed = results.iter().filter(|ok| !**ok).count();
        if failed > 0 {
            warn!(
                trigger = trigger,
                failed = failed,
                total = results.len(),
                "cache invalidation partially failed, stale entries expire by TTL"
            );
        }
        failed == 0
    }
}

fn collection_patterns() -> Vec<String> {
    COLLECTION_VIEWS.iter().map(|view| view.pattern()).collect()
}

fn dimension_patterns(class: &ClassSnapshot) -> Vec<String> {
    DIMENSION_VIEWS
        .iter()
        .filter_map(|&view| dimension_value(class, view).map(|value| view.dimension_pattern(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_patterns_skip_absent_values() {
        let class = ClassSnapshot::new("c1").with_teacher("t10");
        let patterns = dimension_patterns(&class);
        assert_eq!(patterns, vec!["class:teacher:t10:*".to_string()]);
    }

    #[test]
    fn test_collection_patterns_cover_all_collection_views() {
        assert_eq!(
            collection_patterns(),
            vec![
                "class:list:*".to_string(),
                "class:search:*".to_string(),
                "class:counts:*".to_string(),
                "class:export:*".to_string(),
            ]
        );
    }
}
