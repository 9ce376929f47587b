//! Cache service trait and error types.

use async_trait::async_trait;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching upstream calendar feed bodies.
///
/// Implementations must be thread-safe and fail open: a cache failure
/// degrades to fetching the feed from its source.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves a cached feed body.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(body))` on cache hit
    /// - `Ok(None)` on cache miss or error (fail-open behavior)
    async fn get_feed(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores a feed body with an optional TTL in seconds
    /// (implementation-specific default if `None`).
    ///
    /// # Errors
    ///
    /// Should not propagate errors to callers.
    async fn set_feed(&self, key: &str, body: &str, ttl_seconds: Option<u64>) -> CacheResult<()>;

    /// Removes a cached feed.
    ///
    /// # Errors
    ///
    /// Should not propagate errors to callers.
    async fn invalidate(&self, key: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
