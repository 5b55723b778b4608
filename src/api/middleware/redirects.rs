//! Redirect middleware.
//!
//! Runs before personalization on every content request. A matched rule
//! either answers with a client-visible redirect or rewrites the request
//! in place (server transfer) and lets handling continue.
//!
//! Resolution failures never fail the request: the middleware logs and
//! passes through, serving the unredirected page.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::uri::{PathAndQuery, Uri};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use crate::application::redirects::split_locale;
use crate::domain::entities::RedirectType;
use crate::state::AppState;

/// Request extension recording that a server transfer already rewrote this
/// request. Personalization checks it and backs off.
#[derive(Debug, Clone, Copy)]
pub struct RedirectApplied;

pub async fn layer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let raw_query = req
        .uri()
        .query()
        .map(|q| format!("?{}", q))
        .unwrap_or_default();

    let (locale, locale_free_path) =
        split_locale(&path, &state.site_locales, &state.default_locale);

    let matched = match state
        .redirects
        .resolve(locale_free_path, &raw_query, &locale, &state.site_name)
        .await
    {
        Ok(matched) => matched,
        Err(e) => {
            warn!("Redirect resolution failed, passing through: {}", e);
            return next.run(req).await;
        }
    };

    let Some(mut matched) = matched else {
        return next.run(req).await;
    };

    // Literal rules never capture a query during matching; preservation
    // still carries the request's own query string to the target.
    if matched.rule.is_query_string_preserved && matched.matched_query_string.is_empty() {
        matched.matched_query_string = raw_query;
    }
    let target = matched.target_url();

    match matched.rule.redirect_type {
        RedirectType::RedirectTypeMovedPermanently | RedirectType::RedirectTypeFound => {
            let status = if matched.rule.redirect_type == RedirectType::RedirectTypeFound {
                StatusCode::FOUND
            } else {
                StatusCode::MOVED_PERMANENTLY
            };
            match redirect_response(status, &target) {
                Some(response) => {
                    debug!("Redirecting {} -> {} ({})", path, target, status.as_u16());
                    response
                }
                None => {
                    warn!("Redirect target '{}' is not a valid Location value", target);
                    next.run(req).await
                }
            }
        }
        RedirectType::ServerTransfer => match rewritten_uri(req.uri(), &target) {
            Ok(uri) => {
                debug!("Server transfer: {} -> {}", path, target);
                *req.uri_mut() = uri;
                req.extensions_mut().insert(RedirectApplied);
                next.run(req).await
            }
            Err(e) => {
                warn!("Server transfer target '{}' is not rewritable: {}", target, e);
                next.run(req).await
            }
        },
    }
}

/// Builds the redirect response, or `None` when the target is not a valid
/// header value (the caller then serves the unredirected page).
fn redirect_response(status: StatusCode, target: &str) -> Option<Response> {
    let location = HeaderValue::from_str(target).ok()?;
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response.headers_mut().insert(header::LOCATION, location);
    Some(response)
}

/// Replaces the request path and query with the transfer target, keeping
/// scheme and authority intact.
fn rewritten_uri(current: &Uri, target: &str) -> Result<Uri, axum::http::Error> {
    let path_and_query: PathAndQuery = target.parse()?;
    let mut parts = current.clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    Ok(Uri::from_parts(parts)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewritten_uri_replaces_path() {
        let current: Uri = "/old-page?a=1".parse().unwrap();
        let rewritten = rewritten_uri(&current, "/new-page?a=1").unwrap();
        assert_eq!(rewritten.path(), "/new-page");
        assert_eq!(rewritten.query(), Some("a=1"));
    }

    #[test]
    fn test_rewritten_uri_rejects_absolute_target() {
        let current: Uri = "/old-page".parse().unwrap();
        assert!(rewritten_uri(&current, "https://elsewhere.example/x").is_err());
    }

    #[test]
    fn test_redirect_response_sets_location() {
        let response = redirect_response(StatusCode::MOVED_PERMANENTLY, "/new").unwrap();
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/new");
    }

    #[test]
    fn test_redirect_response_rejects_invalid_header_value() {
        assert!(redirect_response(StatusCode::FOUND, "/new\npage").is_none());
    }
}
