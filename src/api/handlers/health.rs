//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Database**: Round-trips a trivial query
/// 2. **Code pool**: Has codes queued or a refill in flight
/// 3. **Access queue**: Channel is open
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = check_database(&state).await;
    let code_pool = check_code_pool(&state);
    let access_queue = check_access_queue(&state);

    let all_healthy = database.is_ok() && code_pool.is_ok() && access_queue.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database,
            code_pool,
            access_queue,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_database(state: &AppState) -> CheckStatus {
    match state.resolver.repository().ping().await {
        Ok(()) => CheckStatus::ok("Connected"),
        Err(e) => CheckStatus::error(format!("Database error: {e}")),
    }
}

/// An empty pool is only unhealthy when nothing is refilling it.
fn check_code_pool(state: &AppState) -> CheckStatus {
    let available = state.pool.count();
    let loading = state.pool.is_loading();

    if available == 0 && !loading {
        CheckStatus::error("No codes available and no refill in flight")
    } else {
        CheckStatus::ok(format!("Available: {available}, loading: {loading}"))
    }
}

fn check_access_queue(state: &AppState) -> CheckStatus {
    if state.access.is_closed() {
        CheckStatus::error("Access queue is closed")
    } else {
        CheckStatus::ok(format!("Capacity: {}", state.access.remaining_capacity()))
    }
}
