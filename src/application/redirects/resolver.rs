//! Cache-backed redirect resolution.

use crate::application::cached::get_or_fetch;
use crate::application::redirects::matcher::{RedirectMatcher, normalize_request_url};
use crate::domain::entities::{RedirectMatch, RedirectRule};
use crate::domain::services::{LookupError, RedirectLookup};
use crate::infrastructure::cache::{CacheOptions, CacheService};
use std::sync::Arc;
use tracing::debug;

/// Resolves redirects for incoming requests: normalizes the URL, loads the
/// rule list through the runtime cache, and runs the matching engine.
///
/// One resolver is shared across all requests; the compiled pattern cache
/// inside the matcher persists between rule-list refreshes.
pub struct RedirectResolver {
    cache: Arc<dyn CacheService>,
    lookup: Arc<dyn RedirectLookup>,
    matcher: RedirectMatcher,
    cache_key: String,
    cache_options: CacheOptions,
}

impl RedirectResolver {
    pub fn new(
        cache: Arc<dyn CacheService>,
        lookup: Arc<dyn RedirectLookup>,
        site_locales: Vec<String>,
        cache_key: String,
        cache_options: CacheOptions,
    ) -> Self {
        Self {
            cache,
            lookup,
            matcher: RedirectMatcher::new(site_locales),
            cache_key,
            cache_options,
        }
    }

    /// Finds the redirect applying to the request, if any.
    ///
    /// `raw_path`/`raw_query` are taken straight from the request URI;
    /// `locale` is the derived routing locale.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] only when the rule list is absent from cache
    /// and the remote fetch fails. Callers log and pass the request through.
    pub async fn resolve(
        &self,
        raw_path: &str,
        raw_query: &str,
        locale: &str,
        site_name: &str,
    ) -> Result<Option<RedirectMatch>, LookupError> {
        let (path, query) = normalize_request_url(raw_path, raw_query);

        let rules: Vec<RedirectRule> = get_or_fetch(
            self.cache.as_ref(),
            &self.cache_key,
            &self.cache_options,
            || async { self.lookup.fetch_redirects(site_name).await },
        )
        .await?;

        let result = self.matcher.find_redirect(&path, &query, locale, &rules);
        if let Some(ref m) = result {
            debug!("Redirect matched: {} -> {}", m.rule.pattern, m.rule.target);
        }
        Ok(result)
    }
}
