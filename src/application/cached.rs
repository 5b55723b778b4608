//! Generic cache-or-fetch wrapper.
//!
//! Composition over inheritance: any lookup strategy wraps itself in
//! [`get_or_fetch`] instead of subclassing a framework middleware. The wrapper
//! is decoupled from any request/response type and works against the
//! [`CacheService`] facade alone.

use crate::domain::services::LookupError;
use crate::infrastructure::cache::{CacheOptions, CacheService};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

/// Looks up `key`; on a hit returns the cached value verbatim (no freshness
/// re-check). On a miss calls `fetch`, stores the result under `key` with the
/// given TTL and tags, and returns it.
///
/// Cache behavior is fail-open in both directions: a corrupt cached payload
/// degrades to a refetch, and a failed `set` is logged without blocking the
/// freshly fetched value from reaching the caller.
///
/// Concurrent misses on the same key may each fetch and overwrite
/// independently; last-writer-wins on the backing store.
///
/// # Errors
///
/// Only `fetch` errors propagate.
pub async fn get_or_fetch<T, F, Fut>(
    cache: &dyn CacheService,
    key: &str,
    options: &CacheOptions,
    fetch: F,
) -> Result<T, LookupError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, LookupError>>,
{
    if let Ok(Some(cached)) = cache.get(key).await {
        match serde_json::from_value(cached) {
            Ok(value) => return Ok(value),
            Err(e) => warn!("Discarding corrupt cache entry {}: {}", key, e),
        }
    }

    info!("{} not in runtime cache, fetching from the platform", key);
    let value = fetch().await?;

    match serde_json::to_value(&value) {
        Ok(json) => {
            if let Err(e) = cache.set(key, &json, options).await {
                warn!("Failed to cache {}: {}", key, e);
            }
        }
        Err(e) => warn!("Failed to serialize value for cache key {}: {}", key, e),
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::MockCacheService;
    use mockall::predicate::eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn options() -> CacheOptions {
        CacheOptions::new(86_400, vec!["refresh-redirects".to_string()])
    }

    #[tokio::test]
    async fn test_miss_fetches_once_and_sets_once() {
        let mut cache = MockCacheService::new();
        cache
            .expect_get()
            .with(eq("redirects"))
            .times(1)
            .returning(|_| Ok(None));
        cache
            .expect_set()
            .withf(|key, value, _| key == "redirects" && *value == json!(["a", "b"]))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let fetches = AtomicUsize::new(0);
        let value: Vec<String> = get_or_fetch(&cache, "redirects", &options(), || async {
            fetches.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["a".to_string(), "b".to_string()])
        })
        .await
        .unwrap();

        assert_eq!(value, vec!["a", "b"]);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hit_skips_fetch() {
        let mut cache = MockCacheService::new();
        cache
            .expect_get()
            .times(1)
            .returning(|_| Ok(Some(json!(["cached"]))));
        cache.expect_set().times(0);

        let value: Vec<String> = get_or_fetch(&cache, "redirects", &options(), || async {
            panic!("fetch must not run on a hit");
        })
        .await
        .unwrap();

        assert_eq!(value, vec!["cached"]);
    }

    #[tokio::test]
    async fn test_corrupt_entry_degrades_to_refetch() {
        let mut cache = MockCacheService::new();
        cache
            .expect_get()
            .times(1)
            .returning(|_| Ok(Some(json!({"not": "a list"}))));
        cache.expect_set().times(1).returning(|_, _, _| Ok(()));

        let value: Vec<String> = get_or_fetch(&cache, "redirects", &options(), || async {
            Ok(vec!["fresh".to_string()])
        })
        .await
        .unwrap();

        assert_eq!(value, vec!["fresh"]);
    }

    #[tokio::test]
    async fn test_failed_set_still_returns_value() {
        let mut cache = MockCacheService::new();
        cache.expect_get().returning(|_| Ok(None));
        cache.expect_set().times(1).returning(|_, _, _| {
            Err(crate::infrastructure::cache::CacheError::OperationError(
                "boom".to_string(),
            ))
        });

        let value: Vec<String> = get_or_fetch(&cache, "redirects", &options(), || async {
            Ok(vec!["fresh".to_string()])
        })
        .await
        .unwrap();

        assert_eq!(value, vec!["fresh"]);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates() {
        let mut cache = MockCacheService::new();
        cache.expect_get().returning(|_| Ok(None));
        cache.expect_set().times(0);

        let result: Result<Vec<String>, _> =
            get_or_fetch(&cache, "redirects", &options(), || async {
                Err(LookupError::request("redirect-lookup", "unreachable"))
            })
            .await;

        assert!(result.is_err());
    }
}
