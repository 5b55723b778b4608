//! The personalization orchestrator.
//!
//! For a matched page, resolves personalization info through the runtime
//! cache, fans out one decision call per experiment execution, and computes
//! the personalized rewrite path from the identified variants.

use crate::application::cached::get_or_fetch;
use crate::application::personalization::rewrite::personalized_rewrite;
use crate::domain::entities::{ExperienceParams, Geo, PersonalizeInfo};
use crate::domain::services::{DecisionRequest, DecisionService, LookupError, PersonalizeLookup};
use crate::infrastructure::cache::{CacheOptions, CacheService};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Static orchestrator settings, derived from [`crate::config::Config`].
#[derive(Debug, Clone)]
pub struct PersonalizeSettings {
    pub site_name: String,
    pub channel: String,
    pub currency: String,
    pub decision_timeout: Duration,
    pub cache_ttl_seconds: u64,
    pub cache_tag: String,
    pub disabled: bool,
    /// Path prefixes that never get personalized.
    pub excluded_routes: Vec<String>,
}

/// Everything the orchestrator needs to know about one request.
#[derive(Debug, Clone, Default)]
pub struct PersonalizeRequest {
    pub path: String,
    pub locale: String,
    pub params: ExperienceParams,
    pub geo: Option<Geo>,
    pub is_preview: bool,
    pub is_prefetch: bool,
    /// A redirect rule already rewrote or redirected this request.
    pub redirect_applied: bool,
}

/// Why a request was passed through unpersonalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    RedirectApplied,
    Preview,
    ExcludedRoute,
    InfoNotFound,
    NoVariantsConfigured,
    /// Prefetch requests are marked non-cacheable but never rewritten.
    Prefetch,
    NoVariantIdentified,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::RedirectApplied => "redirected",
            Self::Preview => "preview",
            Self::ExcludedRoute => "route excluded",
            Self::InfoNotFound => "personalize info not found",
            Self::NoVariantsConfigured => "no personalization configured",
            Self::Prefetch => "prefetch",
            Self::NoVariantIdentified => "no variant(s) identified",
        }
    }
}

/// The orchestrator's verdict for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonalizeOutcome {
    /// Pass through unmodified.
    Skipped(SkipReason),
    /// Rewrite the request to the personalized variant path and mark the
    /// response non-cacheable.
    Rewrite(String),
}

/// Resolves applicable experiments for a page and identifies the visitor's
/// variants, one concurrent decision call per execution.
pub struct PersonalizeOrchestrator {
    cache: Arc<dyn CacheService>,
    lookup: Arc<dyn PersonalizeLookup>,
    decisions: Arc<dyn DecisionService>,
    settings: PersonalizeSettings,
}

impl PersonalizeOrchestrator {
    pub fn new(
        cache: Arc<dyn CacheService>,
        lookup: Arc<dyn PersonalizeLookup>,
        decisions: Arc<dyn DecisionService>,
        settings: PersonalizeSettings,
    ) -> Self {
        Self {
            cache,
            lookup,
            decisions,
            settings,
        }
    }

    /// Runs the full orchestration for one request.
    ///
    /// Skip conditions are checked in order, first match wins; each is
    /// independently observable through [`SkipReason`]. Decision call
    /// failures and timeouts degrade to "no variant identified" for that
    /// execution only.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] only when the personalize info is absent from
    /// cache and the remote fetch fails. Callers catch everything at the top
    /// level and pass the request through.
    pub async fn personalize(
        &self,
        request: &PersonalizeRequest,
    ) -> Result<PersonalizeOutcome, LookupError> {
        if self.settings.disabled {
            return Ok(PersonalizeOutcome::Skipped(SkipReason::Disabled));
        }
        if request.redirect_applied {
            return Ok(PersonalizeOutcome::Skipped(SkipReason::RedirectApplied));
        }
        if request.is_preview {
            return Ok(PersonalizeOutcome::Skipped(SkipReason::Preview));
        }
        if self.is_excluded(&request.path) {
            return Ok(PersonalizeOutcome::Skipped(SkipReason::ExcludedRoute));
        }

        let info = self.resolve_info(request).await?;

        let Some(info) = info else {
            return Ok(PersonalizeOutcome::Skipped(SkipReason::InfoNotFound));
        };
        if info.is_empty() {
            return Ok(PersonalizeOutcome::Skipped(SkipReason::NoVariantsConfigured));
        }
        if request.is_prefetch {
            return Ok(PersonalizeOutcome::Skipped(SkipReason::Prefetch));
        }

        let identified = self.identify_variants(request, &info).await;

        if identified.is_empty() {
            return Ok(PersonalizeOutcome::Skipped(SkipReason::NoVariantIdentified));
        }

        let rewrite_path = personalized_rewrite(&request.path, &identified);
        debug!("Personalize rewrite: {} -> {}", request.path, rewrite_path);
        Ok(PersonalizeOutcome::Rewrite(rewrite_path))
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.settings
            .excluded_routes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Loads personalize info through the runtime cache. A page with no
    /// personalization caches as an explicit null, so repeated requests for
    /// plain pages don't keep hitting the platform.
    async fn resolve_info(
        &self,
        request: &PersonalizeRequest,
    ) -> Result<Option<PersonalizeInfo>, LookupError> {
        let cache_key = format!(
            "personalize:{}:{}:{}",
            request.path, request.locale, self.settings.site_name
        );
        let options = CacheOptions::new(
            self.settings.cache_ttl_seconds,
            vec![self.settings.cache_tag.clone()],
        );

        get_or_fetch(self.cache.as_ref(), &cache_key, &options, || async {
            self.lookup
                .get_personalize_info(&request.path, &request.locale, &self.settings.site_name)
                .await
        })
        .await
    }

    /// Fans out one decision call per execution and collects identified
    /// variants. Completion order is irrelevant: results are ordered by the
    /// page's declared variant list before building the rewrite path.
    async fn identify_variants(
        &self,
        request: &PersonalizeRequest,
        info: &PersonalizeInfo,
    ) -> Vec<String> {
        let mut calls = JoinSet::new();

        for execution in info.executions.clone() {
            let decisions = self.decisions.clone();
            let timeout = self.settings.decision_timeout;
            let decision_request = DecisionRequest {
                channel: self.settings.channel.clone(),
                currency: self.settings.currency.clone(),
                friendly_id: execution.friendly_id.clone(),
                params: request.params.clone(),
                locale: request.locale.clone(),
                candidate_variant_ids: execution.variant_ids.clone(),
                geo: request.geo.clone(),
            };

            calls.spawn(async move {
                let outcome =
                    tokio::time::timeout(timeout, decisions.decide(&decision_request, timeout))
                        .await;
                let variant = match outcome {
                    Ok(Ok(variant)) => variant,
                    Ok(Err(e)) => {
                        warn!("Decision call for {} failed: {}", execution.friendly_id, e);
                        None
                    }
                    Err(_) => {
                        warn!("Decision call for {} timed out", execution.friendly_id);
                        None
                    }
                };
                (execution, variant)
            });
        }

        let mut identified = Vec::new();
        while let Some(joined) = calls.join_next().await {
            let Ok((execution, variant)) = joined else {
                warn!("Decision task panicked; treating as no identification");
                continue;
            };
            if let Some(variant_id) = variant {
                if execution.variant_ids.contains(&variant_id) {
                    identified.push(variant_id);
                } else {
                    debug!(
                        "Discarding variant {} not declared by execution {}",
                        variant_id, execution.friendly_id
                    );
                }
            }
        }

        // Deterministic rewrite path regardless of completion order.
        identified.sort_by_key(|id| info.variant_ids.iter().position(|v| v == id));
        identified
    }
}
