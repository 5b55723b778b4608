mod common;

use axum::http::StatusCode;
use content_edge::api::routes::RESOLVED_PATH_HEADER;
use content_edge::domain::entities::{RedirectRule, RedirectType};
use std::sync::atomic::Ordering;

fn rule(pattern: &str, target: &str, redirect_type: RedirectType) -> RedirectRule {
    RedirectRule {
        pattern: pattern.to_string(),
        target: target.to_string(),
        redirect_type,
        is_query_string_preserved: false,
        locale: None,
    }
}

// ─── CLIENT-VISIBLE REDIRECTS ────────────────────────────────────────────────

#[tokio::test]
async fn test_moved_permanently_is_301_with_location() {
    let app = common::create_test_state(
        vec![rule(
            "/old-page",
            "/new-page",
            RedirectType::RedirectTypeMovedPermanently,
        )],
        None,
        None,
    );
    let server = common::make_server(app.state);

    let response = server.get("/old-page").await;

    response.assert_status(StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.header("location"), "/new-page");
}

#[tokio::test]
async fn test_found_is_302() {
    let app = common::create_test_state(
        vec![rule("/promo", "/sale", RedirectType::RedirectTypeFound)],
        None,
        None,
    );
    let server = common::make_server(app.state);

    let response = server.get("/promo").await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "/sale");
}

#[tokio::test]
async fn test_uppercase_path_still_matches() {
    let app = common::create_test_state(
        vec![rule(
            "/old-page",
            "/new-page",
            RedirectType::RedirectTypeMovedPermanently,
        )],
        None,
        None,
    );
    let server = common::make_server(app.state);

    let response = server.get("/Old-Page").await;

    response.assert_status(StatusCode::MOVED_PERMANENTLY);
}

#[tokio::test]
async fn test_locale_prefixed_request_matches() {
    let app = common::create_test_state(
        vec![rule(
            "/old-page",
            "/new-page",
            RedirectType::RedirectTypeMovedPermanently,
        )],
        None,
        None,
    );
    let server = common::make_server(app.state);

    let response = server.get("/en/old-page").await;

    response.assert_status(StatusCode::MOVED_PERMANENTLY);
}

#[tokio::test]
async fn test_query_string_preserved_on_redirect() {
    let mut preserved = rule("/old-page", "/new-page", RedirectType::RedirectTypeFound);
    preserved.is_query_string_preserved = true;

    let app = common::create_test_state(vec![preserved], None, None);
    let server = common::make_server(app.state);

    let response = server.get("/old-page").add_query_param("a", "1").await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "/new-page?a=1");
}

#[tokio::test]
async fn test_regex_pattern_redirects() {
    let app = common::create_test_state(
        vec![rule(
            "^/blog/(\\d+)$",
            "/articles",
            RedirectType::RedirectTypeFound,
        )],
        None,
        None,
    );
    let server = common::make_server(app.state);

    let response = server.get("/blog/42").await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "/articles");
}

// ─── SERVER TRANSFER ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_server_transfer_rewrites_without_redirect() {
    let app = common::create_test_state(
        vec![rule("/moved", "/destination", RedirectType::ServerTransfer)],
        None,
        None,
    );
    let server = common::make_server(app.state);

    let response = server.get("/moved").await;

    response.assert_status_ok();
    assert_eq!(response.header(RESOLVED_PATH_HEADER), "/destination");
}

// ─── PASS-THROUGH / RESILIENCE ───────────────────────────────────────────────

#[tokio::test]
async fn test_no_match_passes_through() {
    let app = common::create_test_state(
        vec![rule(
            "/old-page",
            "/new-page",
            RedirectType::RedirectTypeMovedPermanently,
        )],
        None,
        None,
    );
    let server = common::make_server(app.state);

    let response = server.get("/unrelated").await;

    response.assert_status_ok();
    assert_eq!(response.header(RESOLVED_PATH_HEADER), "/unrelated");
}

#[tokio::test]
async fn test_lookup_failure_passes_through() {
    let app = common::create_test_state_with(
        vec![],
        true,
        None,
        None,
        common::default_settings(),
    );
    let server = common::make_server(app.state);

    let response = server.get("/old-page").await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_rule_list_is_fetched_once_across_requests() {
    let app = common::create_test_state(
        vec![rule(
            "/old-page",
            "/new-page",
            RedirectType::RedirectTypeMovedPermanently,
        )],
        None,
        None,
    );
    let server = common::make_server(app.state.clone());

    server.get("/old-page").await;
    server.get("/something-else").await;
    server.get("/old-page").await;

    assert_eq!(app.redirect_fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_expiry_forces_refetch() {
    let app = common::create_test_state(
        vec![rule(
            "/old-page",
            "/new-page",
            RedirectType::RedirectTypeMovedPermanently,
        )],
        None,
        None,
    );
    let server = common::make_server(app.state.clone());

    server.get("/old-page").await;
    app.state.cache.expire_tag("refresh-redirects").await.unwrap();
    server.get("/old-page").await;

    assert_eq!(app.redirect_fetches.load(Ordering::SeqCst), 2);
}
