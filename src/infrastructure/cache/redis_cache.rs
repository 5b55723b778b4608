//! Redis-backed cache implementation with tag invalidation.

use super::service::{CacheError, CacheOptions, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use serde_json::Value;
use tracing::{debug, error, info, warn};

/// Redis cache implementation for runtime lookup snapshots.
///
/// Uses connection pooling via `ConnectionManager` for efficient connection
/// reuse. Entries are JSON strings under a namespaced key; each tag maps to a
/// Redis set of member keys so [`CacheService::expire_tag`] can drop entries
/// without knowing their keys. All operations are fail-open: errors are
/// logged but don't propagate to callers.
pub struct RedisCache {
    client: ConnectionManager,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the
    /// connection cannot be established, or the PING health check fails.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        info!("Connecting to Redis at {}", redis_url);

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            key_prefix: "edge:".to_string(),
        })
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// Constructs the Redis set key tracking members of a tag.
    fn build_tag_key(&self, tag: &str) -> String {
        format!("{}tag:{}", self.key_prefix, tag)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Value>> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(&full_key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!("Cache HIT: {}", key);
                    metrics::counter!("cache_hits_total").increment(1);
                    Ok(Some(value))
                }
                Err(e) => {
                    warn!("Corrupt cache payload for {}: {}", key, e);
                    Ok(None)
                }
            },
            Ok(None) => {
                debug!("Cache MISS: {}", key);
                metrics::counter!("cache_misses_total").increment(1);
                Ok(None)
            }
            Err(e) => {
                error!("Redis GET error for {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &Value, options: &CacheOptions) -> CacheResult<()> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize cache value for {}: {}", key, e);
                return Ok(());
            }
        };

        if let Err(e) = conn
            .set_ex::<_, _, ()>(&full_key, raw, options.ttl_seconds)
            .await
        {
            warn!("Redis SET error for {}: {}", key, e);
            return Ok(());
        }

        for tag in &options.tags {
            let tag_key = self.build_tag_key(tag);
            if let Err(e) = conn.sadd::<_, _, ()>(&tag_key, &full_key).await {
                warn!("Redis SADD error for tag {}: {}", tag, e);
                continue;
            }
            // The tag set must outlive its longest-lived member.
            if let Err(e) = conn
                .expire::<_, ()>(&tag_key, options.ttl_seconds as i64)
                .await
            {
                warn!("Redis EXPIRE error for tag {}: {}", tag, e);
            }
        }

        debug!(
            "Cache SET: {} (TTL: {}s, tags: {:?})",
            key, options.ttl_seconds, options.tags
        );
        Ok(())
    }

    async fn expire_tag(&self, tag: &str) -> CacheResult<()> {
        let tag_key = self.build_tag_key(tag);
        let mut conn = self.client.clone();

        let members = match conn.smembers::<_, Vec<String>>(&tag_key).await {
            Ok(members) => members,
            Err(e) => {
                warn!("Redis SMEMBERS error for tag {}: {}", tag, e);
                return Ok(());
            }
        };

        if !members.is_empty() {
            if let Err(e) = conn.del::<_, ()>(members.clone()).await {
                warn!("Redis DEL error for tag {}: {}", tag, e);
            } else {
                debug!("Cache EXPIRE TAG: {} ({} entries)", tag, members.len());
            }
        }

        if let Err(e) = conn.del::<_, ()>(&tag_key).await {
            warn!("Redis DEL error for tag set {}: {}", tag, e);
        }

        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
