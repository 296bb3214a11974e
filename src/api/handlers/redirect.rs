//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its destination.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Paths that cannot be a short code are rejected before any lookup. A
/// resolved code queues an access event without waiting on it and answers
/// `302 Found`.
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown or expired.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    if !state.code_spec.matches(&code) {
        return Err(AppError::not_found(
            "Short code not found",
            json!({ "short_code": code }),
        ));
    }

    let long_url = state.resolver.get(&code).await?;
    state.access.record(&code);

    Ok((StatusCode::FOUND, [(header::LOCATION, long_url)]).into_response())
}
