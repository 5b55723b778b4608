//! Route configuration and middleware layering.

use axum::extract::Request;
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::api::handlers::{expire_cache_handler, health_handler, method_not_allowed_handler};
use crate::api::middleware::{personalize, rate_limit, redirects};
use crate::state::AppState;

/// Response header on origin responses naming the path the pipeline finally
/// resolved, after any server transfer and personalization rewrite.
pub const RESOLVED_PATH_HEADER: &str = "x-resolved-path";

/// Operational API routes.
///
/// - `POST /expire-remote-cache` - Drop cached entries by tag (any other
///   method gets a JSON 405)
pub fn api_routes() -> Router<AppState> {
    Router::new().route(
        "/expire-remote-cache",
        post(expire_cache_handler).fallback(method_not_allowed_handler),
    )
}

/// The content pipeline: every non-API request runs through redirects, then
/// personalization, then reaches the origin fallback.
///
/// Layer order matters: redirects is the outer layer so a server transfer
/// has already moved the request before personalization looks at its path.
pub fn content_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .fallback(origin_handler)
        .layer(from_fn_with_state(state.clone(), personalize::layer))
        .layer(from_fn_with_state(state, redirects::layer))
}

/// The complete application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_routes().layer(rate_limit::secure_layer()))
        .merge(content_routes(state.clone()))
        .layer(crate::api::middleware::tracing::layer())
        .with_state(state)
}

/// Stands in for the downstream renderer: answers with the path the
/// middleware pipeline resolved, so callers (and tests) can observe the
/// final routing decision.
async fn origin_handler(req: Request) -> Response {
    let path = req.uri().path().to_string();

    let mut response = (StatusCode::OK, format!("OK {}", path)).into_response();
    if let Ok(value) = HeaderValue::from_str(&path) {
        response.headers_mut().insert(RESOLVED_PATH_HEADER, value);
    }
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}
