//! Personalization middleware.
//!
//! Builds the visitor context from the request, asks the orchestrator for a
//! verdict, and either rewrites the request to the variant path or passes it
//! through. Any orchestration failure degrades to the default page.

use axum::extract::{Request, State};
use axum::http::uri::{PathAndQuery, Uri};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use crate::api::middleware::redirects::RedirectApplied;
use crate::application::personalization::{PersonalizeOutcome, PersonalizeRequest, SkipReason};
use crate::application::redirects::split_locale;
use crate::domain::entities::{ExperienceParams, Geo};
use crate::state::AppState;

/// Response header naming the internal path a personalized request was
/// rewritten to.
pub const REWRITE_HEADER: &str = "x-edge-rewrite";

/// Response header telling the fronting cache not to store this response.
pub const MIDDLEWARE_CACHE_HEADER: &str = "x-middleware-cache";

/// Geo headers forwarded by the fronting CDN.
const GEO_CITY_HEADER: &str = "x-geo-city";
const GEO_COUNTRY_HEADER: &str = "x-geo-country";
const GEO_REGION_HEADER: &str = "x-geo-region";

pub async fn layer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let (locale, locale_free_path) =
        split_locale(&path, &state.site_locales, &state.default_locale);

    let personalize_request = build_request(&req, locale_free_path, &locale);

    let outcome = match state.personalize.personalize(&personalize_request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("Personalization failed, serving default page: {}", e);
            return next.run(req).await;
        }
    };

    match outcome {
        PersonalizeOutcome::Skipped(SkipReason::Prefetch) => {
            // Prefetches see the default page, but the response must not be
            // cached as the canonical one.
            let mut response = next.run(req).await;
            mark_uncacheable(&mut response);
            response
        }
        PersonalizeOutcome::Skipped(reason) => {
            debug!("Personalization skipped for {}: {}", path, reason.as_str());
            next.run(req).await
        }
        PersonalizeOutcome::Rewrite(rewrite_path) => {
            match rewritten_uri(req.uri(), &rewrite_path) {
                Ok(uri) => {
                    *req.uri_mut() = uri;
                    let mut response = next.run(req).await;
                    if let Ok(value) = HeaderValue::from_str(&rewrite_path) {
                        response.headers_mut().insert(REWRITE_HEADER, value);
                    }
                    mark_uncacheable(&mut response);
                    response
                }
                Err(e) => {
                    warn!("Personalized path '{}' is not rewritable: {}", rewrite_path, e);
                    next.run(req).await
                }
            }
        }
    }
}

/// Extracts the visitor context the orchestrator works from.
fn build_request(req: &Request, locale_free_path: &str, locale: &str) -> PersonalizeRequest {
    PersonalizeRequest {
        path: locale_free_path.to_string(),
        locale: locale.to_string(),
        params: experience_params(req),
        geo: geo_context(req.headers()),
        is_preview: is_preview(req.headers()),
        is_prefetch: is_prefetch(req.headers()),
        redirect_applied: req.extensions().get::<RedirectApplied>().is_some(),
    }
}

/// UTM parameters from the query string plus the referer header.
fn experience_params(req: &Request) -> ExperienceParams {
    let mut params = ExperienceParams::default();

    if let Some(query) = req.uri().query() {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "utm_campaign" => params.campaign = Some(value.into_owned()),
                "utm_content" => params.content = Some(value.into_owned()),
                "utm_medium" => params.medium = Some(value.into_owned()),
                "utm_source" => params.source = Some(value.into_owned()),
                _ => {}
            }
        }
    }

    params.referer = header_value(req.headers(), header::REFERER.as_str());
    params
}

fn geo_context(headers: &HeaderMap) -> Option<Geo> {
    let geo = Geo {
        city: header_value(headers, GEO_CITY_HEADER),
        country: header_value(headers, GEO_COUNTRY_HEADER),
        region: header_value(headers, GEO_REGION_HEADER),
    };

    if geo == Geo::default() { None } else { Some(geo) }
}

/// Preview sessions carry the renderer's bypass cookies and always see the
/// default (editable) page.
fn is_preview(headers: &HeaderMap) -> bool {
    header_value(headers, header::COOKIE.as_str()).is_some_and(|cookies| {
        cookies.contains("__prerender_bypass") || cookies.contains("__next_preview_data")
    })
}

fn is_prefetch(headers: &HeaderMap) -> bool {
    ["purpose", "sec-purpose"].iter().any(|name| {
        header_value(headers, name)
            .is_some_and(|value| value.to_ascii_lowercase().contains("prefetch"))
    })
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn mark_uncacheable(response: &mut Response) {
    response
        .headers_mut()
        .insert(MIDDLEWARE_CACHE_HEADER, HeaderValue::from_static("no-cache"));
}

/// Moves the request to the personalized path, keeping the original query.
fn rewritten_uri(current: &Uri, rewrite_path: &str) -> Result<Uri, axum::http::Error> {
    let combined = match current.query() {
        Some(query) => format!("{}?{}", rewrite_path, query),
        None => rewrite_path.to_string(),
    };
    let path_and_query: PathAndQuery = combined.parse()?;
    let mut parts = current.clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    Ok(Uri::from_parts(parts)?)
}
