mod common;

use axum::http::{StatusCode, header};
use axum::{Router, routing::get};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use pooled_shortener::api::handlers::redirect_handler;
use pooled_shortener::state::AppState;

fn server(state: AppState) -> TestServer {
    let app = Router::new()
        .route("/{code}", get(redirect_handler))
        .with_state(state);
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_redirect_success() {
    let (state, mut ctx) = common::create_test_state(&[], None).await;
    ctx.repository.insert(
        "abc123",
        "https://example.com/target",
        Utc::now() + Duration::days(1),
    );
    let server = server(state);

    let response = server.get("/abc123").await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(
        response.header(header::LOCATION),
        "https://example.com/target"
    );

    let event = ctx.access_rx.try_recv().unwrap();
    assert_eq!(event.short_code, "abc123");
}

#[tokio::test]
async fn test_redirect_second_hit_served_from_cache() {
    let (state, ctx) = common::create_test_state(&[], None).await;
    ctx.repository.insert(
        "abc123",
        "https://example.com",
        Utc::now() + Duration::days(1),
    );
    let resolver = state.resolver.clone();
    let server = server(state);

    server.get("/abc123").await.assert_status(StatusCode::FOUND);
    server.get("/abc123").await.assert_status(StatusCode::FOUND);

    assert_eq!(ctx.repository.finds(), 1);
    assert_eq!(resolver.cache().hits(), 1);
}

#[tokio::test]
async fn test_redirect_not_found() {
    let (state, mut ctx) = common::create_test_state(&[], None).await;
    let server = server(state);

    let response = server.get("/zzzzzz").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "not_found");
    assert!(ctx.access_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_redirect_expired_is_not_found() {
    let (state, ctx) = common::create_test_state(&[], None).await;
    ctx.repository.insert(
        "old123",
        "https://example.com",
        Utc::now() - Duration::hours(1),
    );
    let server = server(state);

    server.get("/old123").await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_redirect_malformed_code_skips_lookup() {
    let (state, ctx) = common::create_test_state(&[], None).await;
    let server = server(state);

    server
        .get("/favicon.ico")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server.get("/abc").await.assert_status(StatusCode::NOT_FOUND);

    assert_eq!(ctx.repository.finds(), 0);
}

#[tokio::test]
async fn test_shortened_code_redirects_without_store_read() {
    let (state, ctx) = common::create_test_state(&["abc123"], Some("http://s.test")).await;
    let link = state
        .link_service
        .shorten("https://example.com/fresh")
        .await
        .unwrap();
    let server = server(state);

    let response = server.get(&format!("/{}", link.short_code)).await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header(header::LOCATION), "https://example.com/fresh");
    assert_eq!(ctx.repository.finds(), 0);
}
