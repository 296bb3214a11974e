//! Handler for link shortening endpoint.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::application::services::link_service::short_url;
use crate::error::AppError;
use crate::state::AppState;

/// Issues a short code for a long URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "long_url": "https://example.com/some/page" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "short_code": "aZ3-_k",
///   "short_url": "http://s.example.com/aZ3-_k",
///   "long_url": "https://example.com/some/page",
///   "expires_at": "2027-01-01T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails and 503 Service Unavailable
/// with `Retry-After` while the code pool is refilling.
pub async fn shorten_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let base = public_base(&state, &headers)?;
    let mapping = state.link_service.shorten(&payload.long_url).await?;

    Ok(Json(ShortenResponse {
        short_url: short_url(&base, &mapping.short_code),
        short_code: mapping.short_code,
        long_url: mapping.long_url,
        expires_at: mapping.expires_at,
    }))
}

/// Configured base URL, or `http://{Host}` from the request.
fn public_base(state: &AppState, headers: &HeaderMap) -> Result<String, AppError> {
    if let Some(base) = &state.base_url {
        return Ok(base.to_string());
    }

    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|host| !host.is_empty())
        .map(|host| format!("http://{host}"))
        .ok_or_else(|| AppError::bad_request("Missing Host header", json!({})))
}
