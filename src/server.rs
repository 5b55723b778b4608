//! HTTP server initialization and runtime setup.
//!
//! Wires the cache backend, platform clients, and middleware pipeline, then
//! runs the Axum server.

use crate::api::routes::app_router;
use crate::application::personalization::{PersonalizeOrchestrator, PersonalizeSettings};
use crate::application::redirects::RedirectResolver;
use crate::config::Config;
use crate::infrastructure::cache::{CacheOptions, CacheService, MemoryCache, NullCache, RedisCache};
use crate::infrastructure::platform::{
    GraphQlClient, GraphQlPersonalizeLookup, GraphQlRedirectLookup, HttpDecisionService,
};
use crate::state::AppState;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Redis cache (process-local cache when Redis is unconfigured, NullCache
///   when the configured Redis is unreachable)
/// - Content platform and decision engine clients
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - The HTTP client cannot be constructed
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let cache = build_cache(&config).await;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let graphql = GraphQlClient::new(
        http.clone(),
        config.edge_endpoint.clone(),
        config.edge_api_key.clone(),
    );

    let redirects = Arc::new(RedirectResolver::new(
        cache.clone(),
        Arc::new(GraphQlRedirectLookup::new(graphql.clone())),
        config.site_locales.clone(),
        config.redirects_cache_key.clone(),
        CacheOptions::new(
            config.cache_ttl_seconds,
            vec![config.redirects_cache_tag.clone()],
        ),
    ));

    let personalize = Arc::new(PersonalizeOrchestrator::new(
        cache.clone(),
        Arc::new(GraphQlPersonalizeLookup::new(graphql)),
        Arc::new(HttpDecisionService::new(
            http,
            config.decision_endpoint.clone(),
            config.decision_api_key.clone(),
        )),
        PersonalizeSettings {
            site_name: config.site_name.clone(),
            channel: config.decision_channel.clone(),
            currency: config.decision_currency.clone(),
            decision_timeout: Duration::from_millis(config.decision_timeout_ms),
            cache_ttl_seconds: config.cache_ttl_seconds,
            cache_tag: config.personalize_cache_tag.clone(),
            disabled: config.personalize_disabled,
            excluded_routes: config.excluded_routes.clone(),
        },
    ));

    let state = AppState {
        cache,
        redirects,
        personalize,
        site_name: config.site_name.clone(),
        site_locales: config.site_locales.clone(),
        default_locale: config.default_locale.clone(),
        expire_secret: config.expire_secret.clone(),
        secret_source: config.secret_source,
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Picks the cache backend for this deployment.
///
/// A configured but unreachable Redis degrades to NullCache rather than
/// refusing to start: every request then pays a platform fetch, but the site
/// stays up.
async fn build_cache(config: &Config) -> Arc<dyn CacheService> {
    match &config.redis_url {
        Some(redis_url) => match RedisCache::connect(redis_url).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        },
        None => {
            tracing::info!("Cache enabled (process-local)");
            Arc::new(MemoryCache::new())
        }
    }
}
