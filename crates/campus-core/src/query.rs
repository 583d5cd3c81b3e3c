//! Normalized list/search query parameters.
//!
//! Controllers parse raw query strings into a [`ListParams`] and use the
//! same value both for the data-store query and for the cache key, so the
//! cache discriminator is always derived from validated, normalized input.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Upper bound on page size accepted from clients.
pub const MAX_PER_PAGE: u32 = 200;

/// Normalized query parameters for class list and search endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Sort field, e.g. `name` or `-created_at` for descending
    #[serde(default)]
    pub sort: Option<String>,
    /// Free-text search term (search endpoint only)
    #[serde(default)]
    pub search: Option<String>,
    /// Dimension filters
    #[serde(default)]
    pub school_id: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
            sort: None,
            search: None,
            school_id: None,
            level: None,
            teacher_id: None,
        }
    }
}

impl ListParams {
    /// Validate bounds before the parameters are used for queries or keys.
    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(CoreError::invalid_query("page must be >= 1"));
        }
        if self.per_page == 0 {
            return Err(CoreError::invalid_query("per_page must be >= 1"));
        }
        if self.per_page > MAX_PER_PAGE {
            return Err(CoreError::invalid_query(format!(
                "per_page must be <= {MAX_PER_PAGE}"
            )));
        }
        Ok(())
    }

    /// Flatten into sorted `name -> value` pairs for cache key derivation.
    ///
    /// Absent optional fields are omitted entirely, so `{search: None}` and
    /// a request that never mentioned `search` produce the same pairs. The
    /// BTreeMap guarantees lexicographic iteration order.
    pub fn to_pairs(&self) -> BTreeMap<String, String> {
        let mut pairs = BTreeMap::new();
        pairs.insert("page".to_string(), self.page.to_string());
        pairs.insert("per_page".to_string(), self.per_page.to_string());
        if let Some(sort) = &self.sort {
            pairs.insert("sort".to_string(), sort.clone());
        }
        if let Some(search) = &self.search {
            pairs.insert("search".to_string(), search.clone());
        }
        if let Some(school_id) = &self.school_id {
            pairs.insert("school_id".to_string(), school_id.clone());
        }
        if let Some(level) = &self.level {
            pairs.insert("level".to_string(), level.clone());
        }
        if let Some(teacher_id) = &self.teacher_id {
            pairs.insert("teacher_id".to_string(), teacher_id.clone());
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ListParams::default();
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 20);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate_bounds() {
        let mut params = ListParams::default();
        params.page = 0;
        assert!(params.validate().is_err());

        let mut params = ListParams::default();
        params.per_page = 0;
        assert!(params.validate().is_err());

        let mut params = ListParams::default();
        params.per_page = MAX_PER_PAGE + 1;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_pairs_are_sorted_and_skip_absent_fields() {
        let mut params = ListParams::default();
        params.teacher_id = Some("t10".to_string());
        params.search = Some("algebra".to_string());

        let pairs = params.to_pairs();
        let names: Vec<&str> = pairs.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["page", "per_page", "search", "teacher_id"]);
    }

    #[test]
    fn test_deserialize_partial_query() {
        let params: ListParams = serde_json::from_str(r#"{"school_id":"s5"}"#).unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.school_id.as_deref(), Some("s5"));
    }
}
