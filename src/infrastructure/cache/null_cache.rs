//! No-op cache implementation for disabled caching.

use super::service::{CacheOptions, CacheResult, CacheService};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// A cache implementation that does nothing.
///
/// All operations succeed immediately without storing or retrieving data, so
/// every lookup goes to the content platform.
///
/// # Use Cases
///
/// - Diagnosing stale-content issues with caching switched off
/// - Fallback when the Redis connection fails at startup
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Value>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &Value, _options: &CacheOptions) -> CacheResult<()> {
        Ok(())
    }

    async fn expire_tag(&self, _tag: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
