//! Repository trait for short code mappings.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{Mapping, NewMapping};
use crate::error::AppError;

/// Durable store of short code mappings.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgMappingRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingRepository: Send + Sync {
    /// Persists a new mapping.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code is already stored and
    /// [`AppError::Internal`] on database errors.
    async fn create(&self, new_mapping: NewMapping) -> Result<Mapping, AppError>;

    /// Finds a mapping by short code that has not expired at `now`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Mapping))` if found and active
    /// - `Ok(None)` if missing or expired
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_active(
        &self,
        short_code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Mapping>, AppError>;

    /// Adds one to the access counter of a mapping.
    ///
    /// Unknown codes are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn increment_access_count(&self, short_code: &str) -> Result<(), AppError>;

    /// Counts every stored mapping, expired or not.
    async fn count_all(&self) -> Result<i64, AppError>;

    /// Counts mappings that have not expired at `now`.
    async fn count_active(&self, now: DateTime<Utc>) -> Result<i64, AppError>;

    /// Sums the access counters of every stored mapping.
    async fn sum_access_count(&self) -> Result<i64, AppError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
