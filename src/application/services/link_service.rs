//! Short link creation from pre-generated codes.

use std::sync::Arc;

use serde_json::json;
use url::Url;

use crate::application::services::LayeredResolver;
use crate::domain::entities::Mapping;
use crate::domain::repositories::MappingRepository;
use crate::error::AppError;
use crate::pool::CodePool;

/// Issues a fresh code from the [`CodePool`] for every new destination.
///
/// A code withdrawn from the pool is never returned to it. If the store
/// rejects the mapping the code is wasted.
pub struct LinkService<R: MappingRepository + ?Sized = dyn MappingRepository> {
    pool: CodePool,
    resolver: Arc<LayeredResolver<R>>,
}

impl<R: MappingRepository + ?Sized> LinkService<R> {
    pub fn new(pool: CodePool, resolver: Arc<LayeredResolver<R>>) -> Self {
        Self { pool, resolver }
    }

    /// Creates a short link for `long_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is not absolute HTTP(S),
    /// [`AppError::Unavailable`] if the pool is momentarily empty, and
    /// whatever the store fails with otherwise.
    pub async fn shorten(&self, long_url: &str) -> Result<Mapping, AppError> {
        check_destination(long_url)?;

        let code = self.pool.acquire()?;
        self.resolver.save(&code, long_url).await
    }
}

/// Builds the public short URL for `code` under `base`.
pub fn short_url(base: &str, code: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), code)
}

fn check_destination(long_url: &str) -> Result<(), AppError> {
    let url = Url::parse(long_url).map_err(|e| {
        AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
    })?;

    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(()),
        scheme => Err(AppError::bad_request(
            "Only HTTP and HTTPS URLs can be shortened",
            json!({ "scheme": scheme }),
        )),
    }
}
