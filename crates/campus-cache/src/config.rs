//! Cache configuration.
//!
//! Backend selection happens once at startup via [`CacheSettings`]: Redis
//! when enabled and reachable, the in-process store otherwise. TTLs default
//! to the per-view table in [`crate::keys::View`] and can be overridden per
//! deployment through [`TtlConfig`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::keys::View;

/// Top-level cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub ttl: TtlConfig,
    /// Interval between expired-entry sweeps of the in-process store
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            redis: RedisConfig::default(),
            ttl: TtlConfig::default(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl CacheSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.sweep_interval_secs == 0 {
            return Err("cache.sweep_interval_secs must be > 0".into());
        }
        self.redis.validate()?;
        self.ttl.validate()
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Redis configuration for shared caching across instances
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Enable Redis (gracefully degrades without it)
    /// Default: false (disabled for single-instance deployments)
    #[serde(default = "default_redis_enabled")]
    pub enabled: bool,

    /// Redis connection URL (e.g., "redis://localhost:6379")
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Connection pool size
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: usize,

    /// Connection timeout in milliseconds
    #[serde(default = "default_redis_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_redis_enabled() -> bool {
    false
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_pool_size() -> usize {
    10
}

fn default_redis_timeout_ms() -> u64 {
    5000
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: default_redis_enabled(),
            url: default_redis_url(),
            pool_size: default_redis_pool_size(),
            timeout_ms: default_redis_timeout_ms(),
        }
    }
}

impl RedisConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.enabled && self.url.is_empty() {
            return Err("cache.redis.enabled=true requires cache.redis.url".into());
        }
        if self.pool_size == 0 {
            return Err("cache.redis.pool_size must be > 0".into());
        }
        if self.timeout_ms == 0 {
            return Err("cache.redis.timeout_ms must be > 0".into());
        }
        Ok(())
    }
}

/// Per-view TTL overrides, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtlConfig {
    #[serde(default = "default_data_ttl_secs")]
    pub data_secs: u64,
    #[serde(default = "default_list_ttl_secs")]
    pub list_secs: u64,
    #[serde(default = "default_search_ttl_secs")]
    pub search_secs: u64,
    #[serde(default = "default_counts_ttl_secs")]
    pub counts_secs: u64,
    #[serde(default = "default_analytics_ttl_secs")]
    pub analytics_secs: u64,
    #[serde(default = "default_performance_ttl_secs")]
    pub performance_secs: u64,
    #[serde(default = "default_export_ttl_secs")]
    pub export_secs: u64,
    /// Shared TTL for the school/level/teacher dimension indexes
    #[serde(default = "default_dimension_ttl_secs")]
    pub dimension_secs: u64,
}

fn default_data_ttl_secs() -> u64 {
    300
}

fn default_list_ttl_secs() -> u64 {
    60
}

fn default_search_ttl_secs() -> u64 {
    120
}

fn default_counts_ttl_secs() -> u64 {
    300
}

fn default_analytics_ttl_secs() -> u64 {
    1800
}

fn default_performance_ttl_secs() -> u64 {
    3600
}

fn default_export_ttl_secs() -> u64 {
    300
}

fn default_dimension_ttl_secs() -> u64 {
    60
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            data_secs: default_data_ttl_secs(),
            list_secs: default_list_ttl_secs(),
            search_secs: default_search_ttl_secs(),
            counts_secs: default_counts_ttl_secs(),
            analytics_secs: default_analytics_ttl_secs(),
            performance_secs: default_performance_ttl_secs(),
            export_secs: default_export_ttl_secs(),
            dimension_secs: default_dimension_ttl_secs(),
        }
    }
}

impl TtlConfig {
    /// Resolve the TTL for a view.
    pub fn for_view(&self, view: View) -> Duration {
        let secs = match view {
            View::Data => self.data_secs,
            View::List => self.list_secs,
            View::Search => self.search_secs,
            View::Counts => self.counts_secs,
            View::Analytics => self.analytics_secs,
            View::Performance => self.performance_secs,
            View::Export => self.export_secs,
            View::School | View::Level | View::Teacher => self.dimension_secs,
        };
        Duration::from_secs(secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        let ttls = [
            ("data_secs", self.data_secs),
            ("list_secs", self.list_secs),
            ("search_secs", self.search_secs),
            ("counts_secs", self.counts_secs),
            ("analytics_secs", self.analytics_secs),
            ("performance_secs", self.performance_secs),
            ("export_secs", self.export_secs),
            ("dimension_secs", self.dimension_secs),
        ];
        for (name, secs) in ttls {
            if secs == 0 {
                return Err(format!("cache.ttl.{name} must be > 0"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = CacheSettings::default();
        assert!(!settings.redis.enabled);
        assert_eq!(settings.redis.url, "redis://localhost:6379");
        assert_eq!(settings.sweep_interval_secs, 60);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_default_ttl_table() {
        let ttl = TtlConfig::default();
        assert_eq!(ttl.for_view(View::Data), Duration::from_secs(300));
        assert_eq!(ttl.for_view(View::List), Duration::from_secs(60));
        assert_eq!(ttl.for_view(View::Search), Duration::from_secs(120));
        assert_eq!(ttl.for_view(View::Counts), Duration::from_secs(300));
        assert_eq!(ttl.for_view(View::Analytics), Duration::from_secs(1800));
        assert_eq!(ttl.for_view(View::Performance), Duration::from_secs(3600));
        assert_eq!(ttl.for_view(View::Export), Duration::from_secs(300));
        assert_eq!(ttl.for_view(View::School), Duration::from_secs(60));
        assert_eq!(ttl.for_view(View::Teacher), Duration::from_secs(60));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut settings = CacheSettings::default();
        settings.sweep_interval_secs = 0;
        assert!(settings.validate().is_err());

        let mut settings = CacheSettings::default();
        settings.redis.pool_size = 0;
        assert!(settings.validate().is_err());

        let mut settings = CacheSettings::default();
        settings.ttl.list_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_requires_url_when_enabled() {
        let mut settings = CacheSettings::default();
        settings.redis.enabled = true;
        settings.redis.url = String::new();
        assert!(settings.validate().is_err());
    }
}
