use thiserror::Error;

/// Errors produced at the backing-store boundary.
///
/// These never escape the cache layer: [`crate::KeyedCache`] logs them and
/// converts every failure into a benign miss/not-stored result, so cache
/// problems degrade to cold-cache behavior instead of failed requests.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cache connection pool error: {0}")]
    Pool(String),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    pub fn pool(message: impl Into<String>) -> Self {
        Self::Pool(message.into())
    }
}

/// Convenience result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
