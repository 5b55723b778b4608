//! Cache service trait and error types.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Write options for a cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOptions {
    /// Time to live in seconds.
    pub ttl_seconds: u64,
    /// Tags enabling bulk invalidation without knowing exact keys.
    pub tags: Vec<String>,
}

impl CacheOptions {
    pub fn new(ttl_seconds: u64, tags: Vec<String>) -> Self {
        Self { ttl_seconds, tags }
    }
}

/// Trait for the runtime key-value cache fronting remote lookups.
///
/// Entries are JSON values stored wholesale: a key is either absent or holds
/// a complete snapshot of the most recent remote fetch, never a partial or
/// merged value.
///
/// Implementations must be thread-safe and handle backend errors gracefully:
/// cache failures degrade to remote lookups and must never disrupt a request.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis with tag sets
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process map
/// - [`crate::infrastructure::cache::NullCache`] - No-op
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the value stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` on cache hit
    /// - `Ok(None)` on cache miss or backend error (fail-open behavior)
    async fn get(&self, key: &str) -> CacheResult<Option<Value>>;

    /// Stores `value` under `key` with the given TTL and tags, replacing any
    /// previous entry wholesale.
    ///
    /// # Errors
    ///
    /// Implementations should log backend errors and return `Ok(())` so a
    /// failed write never blocks returning freshly fetched data.
    async fn set(&self, key: &str, value: &Value, options: &CacheOptions) -> CacheResult<()>;

    /// Expires every entry carrying `tag`.
    ///
    /// Idempotent: expiring a tag with no entries is a successful no-op.
    async fn expire_tag(&self, tag: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
