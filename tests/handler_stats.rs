mod common;

use axum::http::StatusCode;
use axum::{
    Router,
    routing::{get, post},
};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use pooled_shortener::api::handlers::{redirect_handler, shorten_handler, stats_handler};
use pooled_shortener::state::AppState;
use serde_json::json;

fn server(state: AppState) -> TestServer {
    let app = Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/api/shorten", post(shorten_handler))
        .route("/api/stats", get(stats_handler))
        .with_state(state);
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_stats_empty() {
    let (state, _ctx) = common::create_test_state(&["abc123", "def456"], None).await;
    let server = server(state);

    let response = server.get("/api/stats").await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["total_urls"], 0);
    assert_eq!(json["active_urls"], 0);
    assert_eq!(json["expired_urls"], 0);
    assert_eq!(json["total_access"], 0);
    assert_eq!(json["cache_hit_rate"], 0.0);
    assert_eq!(json["cache_size"], 0);
    assert_eq!(json["pool_available"], 2);
    assert_eq!(json["pool_loading"], false);
}

#[tokio::test]
async fn test_stats_counts_mappings_and_cache() {
    let (state, ctx) =
        common::create_test_state(&["abc123", "def456"], Some("http://s.test")).await;
    ctx.repository.insert(
        "old123",
        "https://old.example.com",
        Utc::now() - Duration::days(1),
    );
    let server = server(state);

    server
        .post("/api/shorten")
        .json(&json!({ "long_url": "https://example.com" }))
        .await
        .assert_status_ok();

    // One hit from the cache populated by the save, one miss for the unknown code.
    server.get("/abc123").await;
    server.get("/zzz999").await;

    let json = server.get("/api/stats").await.json::<serde_json::Value>();
    assert_eq!(json["total_urls"], 2);
    assert_eq!(json["active_urls"], 1);
    assert_eq!(json["expired_urls"], 1);
    assert_eq!(json["cache_hit_rate"], 0.5);
    assert_eq!(json["cache_size"], 1);
    assert_eq!(json["pool_available"], 1);
}

#[tokio::test]
async fn test_stats_store_failure() {
    let (state, ctx) = common::create_test_state(&[], None).await;
    ctx.repository
        .unreachable
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let server = server(state);

    let response = server.get("/api/stats").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}
