//! Handler for service-wide statistics.

use axum::{Json, extract::State};

use crate::api::dto::stats::StatsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns mapping counters with cache and pool state.
///
/// # Endpoint
///
/// `GET /api/stats`
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.resolver.stats().await?;

    Ok(Json(StatsResponse {
        total_urls: stats.total_count,
        active_urls: stats.active_count,
        expired_urls: stats.expired_count,
        total_access: stats.total_access,
        cache_hit_rate: stats.cache_hit_rate,
        cache_size: state.resolver.cache().size(),
        pool_available: state.pool.count(),
        pool_loading: state.pool.is_loading(),
    }))
}
