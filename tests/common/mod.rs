//! Shared test fixtures: stub platform services and state construction.
//!
//! Integration tests exercise the real pipeline (cache, resolver,
//! orchestrator, middleware) against in-process stubs for the two remote
//! systems.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::routing::get;
use axum_test::TestServer;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use content_edge::api::handlers::health_handler;
use content_edge::api::routes::{api_routes, content_routes};
use content_edge::application::personalization::{PersonalizeOrchestrator, PersonalizeSettings};
use content_edge::application::redirects::RedirectResolver;
use content_edge::config::SecretSource;
use content_edge::domain::entities::{PersonalizeInfo, RedirectRule};
use content_edge::domain::services::{
    DecisionRequest, DecisionService, LookupError, PersonalizeLookup, RedirectLookup,
};
use content_edge::infrastructure::cache::{CacheOptions, MemoryCache};
use content_edge::state::AppState;

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_SITE: &str = "test-site";

pub struct StubRedirectLookup {
    pub rules: Vec<RedirectRule>,
    pub fail: bool,
    pub fetches: Arc<AtomicUsize>,
}

#[async_trait]
impl RedirectLookup for StubRedirectLookup {
    async fn fetch_redirects(&self, _site_name: &str) -> Result<Vec<RedirectRule>, LookupError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(LookupError::request("redirect-lookup", "unavailable"));
        }
        Ok(self.rules.clone())
    }
}

pub struct StubPersonalizeLookup {
    pub info: Option<PersonalizeInfo>,
    pub fetches: Arc<AtomicUsize>,
}

#[async_trait]
impl PersonalizeLookup for StubPersonalizeLookup {
    async fn get_personalize_info(
        &self,
        _path: &str,
        _locale: &str,
        _site_name: &str,
    ) -> Result<Option<PersonalizeInfo>, LookupError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.info.clone())
    }
}

pub struct StubDecisionService {
    pub variant: Option<String>,
}

#[async_trait]
impl DecisionService for StubDecisionService {
    async fn decide(
        &self,
        _request: &DecisionRequest,
        _timeout: Duration,
    ) -> Result<Option<String>, LookupError> {
        Ok(self.variant.clone())
    }
}

/// Everything a test needs to drive the app and observe platform traffic.
pub struct TestApp {
    pub state: AppState,
    pub redirect_fetches: Arc<AtomicUsize>,
    pub personalize_fetches: Arc<AtomicUsize>,
}

pub fn default_settings() -> PersonalizeSettings {
    PersonalizeSettings {
        site_name: TEST_SITE.to_string(),
        channel: "WEB".to_string(),
        currency: "USD".to_string(),
        decision_timeout: Duration::from_millis(400),
        cache_ttl_seconds: 3600,
        cache_tag: "refresh-personalize".to_string(),
        disabled: false,
        excluded_routes: vec!["/api".to_string(), "/health".to_string()],
    }
}

pub fn create_test_state(
    rules: Vec<RedirectRule>,
    info: Option<PersonalizeInfo>,
    variant: Option<String>,
) -> TestApp {
    create_test_state_with(rules, false, info, variant, default_settings())
}

pub fn create_test_state_with(
    rules: Vec<RedirectRule>,
    fail_redirects: bool,
    info: Option<PersonalizeInfo>,
    variant: Option<String>,
    settings: PersonalizeSettings,
) -> TestApp {
    let cache = Arc::new(MemoryCache::new());
    let redirect_fetches = Arc::new(AtomicUsize::new(0));
    let personalize_fetches = Arc::new(AtomicUsize::new(0));

    let redirects = Arc::new(RedirectResolver::new(
        cache.clone(),
        Arc::new(StubRedirectLookup {
            rules,
            fail: fail_redirects,
            fetches: redirect_fetches.clone(),
        }),
        vec!["en".to_string(), "fr".to_string()],
        "redirects".to_string(),
        CacheOptions::new(3600, vec!["refresh-redirects".to_string()]),
    ));

    let personalize = Arc::new(PersonalizeOrchestrator::new(
        cache.clone(),
        Arc::new(StubPersonalizeLookup {
            info,
            fetches: personalize_fetches.clone(),
        }),
        Arc::new(StubDecisionService { variant }),
        settings,
    ));

    let state = AppState {
        cache,
        redirects,
        personalize,
        site_name: TEST_SITE.to_string(),
        site_locales: vec!["en".to_string(), "fr".to_string()],
        default_locale: "en".to_string(),
        expire_secret: TEST_SECRET.to_string(),
        secret_source: SecretSource::Header,
    };

    TestApp {
        state,
        redirect_fetches,
        personalize_fetches,
    }
}

/// The full route surface without the rate limiter (no peer address in
/// `TestServer`).
pub fn make_server(state: AppState) -> TestServer {
    let app = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_routes())
        .merge(content_routes(state.clone()))
        .with_state(state);
    TestServer::new(app).unwrap()
}
