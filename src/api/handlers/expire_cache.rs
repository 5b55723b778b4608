//! Handler for the remote-cache invalidation endpoint.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::api::dto::expire::ExpireResponse;
use crate::config::SecretSource;
use crate::error::AppError;
use crate::state::AppState;

/// Request header carrying the shared secret in the `header` profile.
pub const SECRET_HEADER: &str = "x-remote-cache-secret";

/// Expires every cached entry carrying a tag.
///
/// # Endpoint
///
/// `POST /api/expire-remote-cache?tag={tag}`
///
/// The shared secret arrives either in the `x-remote-cache-secret` header or
/// the `secret` query parameter, depending on the configured
/// [`SecretSource`]. The other location is ignored entirely.
///
/// # Response Codes
///
/// - **200 OK**: Entries under the tag were dropped (idempotent; an unknown
///   tag still succeeds)
/// - **400 Bad Request**: Missing `tag` parameter
/// - **401 Unauthorized**: Missing or wrong secret
/// - **405 Method Not Allowed**: Any method other than POST
pub async fn expire_cache_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Json<ExpireResponse>, AppError> {
    let provided = match state.secret_source {
        SecretSource::Header => headers
            .get(SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        SecretSource::Query => params.get("secret").cloned(),
    };

    let authorized = provided
        .as_deref()
        .is_some_and(|p| secrets_match(p, &state.expire_secret));
    if !authorized {
        warn!("Cache expiry rejected: invalid or missing secret");
        return Err(AppError::unauthorized("Invalid or missing secret"));
    }

    let tag = params
        .get("tag")
        .map(String::as_str)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing required 'tag' parameter"))?;

    state
        .cache
        .expire_tag(tag)
        .await
        .map_err(|e| AppError::internal(format!("Cache expiry failed: {}", e)))?;

    info!("Cache tag expired: {}", tag);
    metrics::counter!("cache_tag_expirations_total", "tag" => tag.to_string()).increment(1);

    Ok(Json(ExpireResponse {
        success: true,
        message: format!("Cache entries tagged '{}' expired", tag),
    }))
}

/// JSON 405 for non-POST methods on the invalidation route.
///
/// Registered as the route fallback so the error envelope matches the rest
/// of the endpoint instead of axum's default empty 405.
pub async fn method_not_allowed_handler() -> AppError {
    AppError::method_not_allowed("Method not allowed, use POST")
}

/// Compares the provided secret against the configured one via SHA-256
/// digests, avoiding a length-dependent early exit on the raw strings.
fn secrets_match(provided: &str, expected: &str) -> bool {
    Sha256::digest(provided.as_bytes()) == Sha256::digest(expected.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_match() {
        assert!(secrets_match("s3cret", "s3cret"));
        assert!(!secrets_match("s3cret", "other"));
        assert!(!secrets_match("", "s3cret"));
        assert!(secrets_match("", ""));
    }
}
