mod common;

use axum::http::StatusCode;
use axum::{Router, routing::get};
use axum_test::TestServer;
use pooled_shortener::api::handlers::health_handler;
use pooled_shortener::state::AppState;
use std::sync::atomic::Ordering;

fn server(state: AppState) -> TestServer {
    let app = Router::new()
        .route("/health", get(health_handler))
        .with_state(state);
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_endpoint_success() {
    let (state, _ctx) = common::create_test_state(&["abc123"], None).await;
    let server = server(state);

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["code_pool"]["status"], "ok");
    assert_eq!(json["checks"]["access_queue"]["status"], "ok");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let (state, _ctx) = common::create_test_state(&["abc123"], None).await;
    let server = server(state);

    let json = server.get("/health").await.json::<serde_json::Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json["checks"].get("database").is_some());
    assert!(json["checks"].get("code_pool").is_some());
    assert!(json["checks"].get("access_queue").is_some());
}

#[tokio::test]
async fn test_health_degraded_when_pool_drained() {
    let (state, _ctx) = common::create_test_state(&[], None).await;
    let server = server(state);

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["code_pool"]["status"], "error");
    assert_eq!(json["checks"]["database"]["status"], "ok");
}

#[tokio::test]
async fn test_health_degraded_when_store_unreachable() {
    let (state, ctx) = common::create_test_state(&["abc123"], None).await;
    ctx.repository.unreachable.store(true, Ordering::SeqCst);
    let server = server(state);

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["checks"]["database"]["status"], "error");
}

#[tokio::test]
async fn test_health_degraded_when_access_worker_gone() {
    let (state, ctx) = common::create_test_state(&["abc123"], None).await;
    drop(ctx.access_rx);
    let server = server(state);

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["checks"]["access_queue"]["status"], "error");
}
