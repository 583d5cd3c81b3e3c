//! Pagination envelope shapes shared by controllers and the cache.
//!
//! `total`, `total_pages` and `has_next` are always derived from the same
//! count: the number of records remaining after *all* filters have been
//! applied, including any post-query in-memory filters. Endpoints that
//! filter after the data-store query must recompute the metadata from the
//! filtered set rather than reuse the store's raw count.

use serde::{Deserialize, Serialize};

/// Pagination metadata for list/search responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Post-filter total across all pages
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    /// Compute metadata from a post-filter total.
    pub fn new(total: u64, page: u32, per_page: u32) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            total.div_ceil(per_page.max(1) as u64) as u32
        };
        Self {
            total,
            page,
            per_page,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1 && total_pages > 0,
        }
    }
}

/// A page of records plus its metadata, the shape written through the cache
/// for list and search views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, meta: PageMeta) -> Self {
        Self { items, meta }
    }

    /// An empty page (used when a filter eliminates every record).
    pub fn empty(page: u32, per_page: u32) -> Self {
        Self {
            items: Vec::new(),
            meta: PageMeta::new(0, page, per_page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_exact_division() {
        let meta = PageMeta::new(40, 1, 20);
        assert_eq!(meta.total_pages, 2);
        assert!(meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn test_meta_partial_last_page() {
        let meta = PageMeta::new(41, 3, 20);
        assert_eq!(meta.total_pages, 3);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_meta_empty_result() {
        let meta = PageMeta::new(0, 1, 20);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn test_page_round_trip() {
        let page = Page::new(vec!["a".to_string(), "b".to_string()], PageMeta::new(2, 1, 20));
        let json = serde_json::to_string(&page).unwrap();
        let back: Page<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, page);
    }
}
