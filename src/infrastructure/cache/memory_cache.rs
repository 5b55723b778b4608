//! In-process cache implementation.

use super::service::{CacheOptions, CacheResult, CacheService};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

struct Entry {
    value: Value,
    expires_at: Instant,
    tags: Vec<String>,
}

/// A process-local cache backed by a `HashMap`.
///
/// Used when Redis is not configured and throughout the test suites. Expired
/// entries are dropped lazily on read; tag expiry walks the map. Not intended
/// for multi-instance deployments, where entries must be shared.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    /// Creates a new empty MemoryCache.
    pub fn new() -> Self {
        debug!("Using MemoryCache (process-local)");
        Self::default()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Value>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    metrics::counter!("cache_hits_total").increment(1);
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
                None => {
                    metrics::counter!("cache_misses_total").increment(1);
                    return Ok(None);
                }
            }
        }

        // Entry exists but is expired; drop it.
        self.entries.write().await.remove(key);
        metrics::counter!("cache_misses_total").increment(1);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &Value, options: &CacheOptions) -> CacheResult<()> {
        let entry = Entry {
            value: value.clone(),
            expires_at: Instant::now() + Duration::from_secs(options.ttl_seconds),
            tags: options.tags.clone(),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn expire_tag(&self, tag: &str) -> CacheResult<()> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.tags.iter().any(|t| t == tag));
        let dropped = before - entries.len();
        if dropped > 0 {
            debug!("Cache EXPIRE TAG: {} ({} entries)", tag, dropped);
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
