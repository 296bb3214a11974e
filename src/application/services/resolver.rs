//! Cache-in-front-of-store resolution of short codes.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use tracing::debug;

use crate::domain::entities::{Mapping, NewMapping};
use crate::domain::repositories::MappingRepository;
use crate::error::AppError;
use crate::infrastructure::cache::LruCache;

/// Aggregate counters over every stored mapping plus the cache hit rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub total_count: i64,
    pub active_count: i64,
    pub expired_count: i64,
    pub total_access: i64,
    pub cache_hit_rate: f64,
}

/// Resolves short codes through an [`LruCache`] backed by a
/// [`MappingRepository`].
///
/// Writes go to the store first and reach the cache only once the store
/// accepted them, so the cache never holds a mapping the store rejected.
/// Reads hit the store only on a cache miss.
pub struct LayeredResolver<R: MappingRepository + ?Sized = dyn MappingRepository> {
    repository: Arc<R>,
    cache: Arc<LruCache>,
    link_ttl: Duration,
}

impl<R: MappingRepository + ?Sized> LayeredResolver<R> {
    /// Creates a resolver whose new mappings live for `link_ttl`.
    pub fn new(repository: Arc<R>, cache: Arc<LruCache>, link_ttl: Duration) -> Self {
        Self {
            repository,
            cache,
            link_ttl,
        }
    }

    pub fn cache(&self) -> &LruCache {
        &self.cache
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn link_ttl(&self) -> Duration {
        self.link_ttl
    }

    /// Stores a new mapping and caches it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the code is already stored; the
    /// cache is left untouched in that case.
    pub async fn save(&self, short_code: &str, long_url: &str) -> Result<Mapping, AppError> {
        let mapping = self
            .repository
            .create(NewMapping {
                short_code: short_code.to_string(),
                long_url: long_url.to_string(),
                expires_at: Utc::now() + self.link_ttl,
            })
            .await?;

        self.cache.put(short_code, long_url);
        Ok(mapping)
    }

    /// Returns the destination for `short_code`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown or expired.
    pub async fn get(&self, short_code: &str) -> Result<String, AppError> {
        if let Some(long_url) = self.cache.get(short_code) {
            debug!(short_code, "cache hit");
            return Ok(long_url);
        }
        debug!(short_code, "cache miss");

        let mapping = self
            .repository
            .find_active(short_code, Utc::now())
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    "Short code not found",
                    json!({ "short_code": short_code }),
                )
            })?;

        self.cache.put(short_code, mapping.long_url.clone());
        Ok(mapping.long_url)
    }

    /// Adds one to the stored access counter of `short_code`.
    pub async fn increment_access(&self, short_code: &str) -> Result<(), AppError> {
        self.repository.increment_access_count(short_code).await
    }

    /// Collects store-wide counters and the cache hit rate.
    pub async fn stats(&self) -> Result<Stats, AppError> {
        let now = Utc::now();
        let total_count = self.repository.count_all().await?;
        let active_count = self.repository.count_active(now).await?;
        let total_access = self.repository.sum_access_count().await?;

        Ok(Stats {
            total_count,
            active_count,
            expired_count: (total_count - active_count).max(0),
            total_access,
            cache_hit_rate: self.cache.hit_rate(),
        })
    }
}
