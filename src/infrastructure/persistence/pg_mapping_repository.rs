//! PostgreSQL implementation of the mapping repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{Mapping, NewMapping};
use crate::domain::repositories::MappingRepository;
use crate::error::AppError;

const MAPPING_COLUMNS: &str =
    "id, short_code, long_url, access_count, expires_at, created_at, updated_at";

#[derive(FromRow)]
struct MappingRow {
    id: i64,
    short_code: String,
    long_url: String,
    access_count: i64,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MappingRow> for Mapping {
    fn from(row: MappingRow) -> Self {
        Mapping {
            id: row.id,
            short_code: row.short_code,
            long_url: row.long_url,
            access_count: row.access_count,
            expires_at: row.expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL repository for the `url_mappings` table.
///
/// All values are passed as bind parameters.
pub struct PgMappingRepository {
    pool: Arc<PgPool>,
}

impl PgMappingRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MappingRepository for PgMappingRepository {
    async fn create(&self, new_mapping: NewMapping) -> Result<Mapping, AppError> {
        let sql = format!(
            "INSERT INTO url_mappings (short_code, long_url, expires_at) \
             VALUES ($1, $2, $3) \
             RETURNING {MAPPING_COLUMNS}"
        );

        let row = sqlx::query_as::<_, MappingRow>(&sql)
            .bind(&new_mapping.short_code)
            .bind(&new_mapping.long_url)
            .bind(new_mapping.expires_at)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn find_active(
        &self,
        short_code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Mapping>, AppError> {
        let sql = format!(
            "SELECT {MAPPING_COLUMNS} FROM url_mappings \
             WHERE short_code = $1 AND expires_at > $2"
        );

        let row = sqlx::query_as::<_, MappingRow>(&sql)
            .bind(short_code)
            .bind(now)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Mapping::from))
    }

    async fn increment_access_count(&self, short_code: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE url_mappings
            SET access_count = access_count + 1, updated_at = NOW()
            WHERE short_code = $1
            "#,
        )
        .bind(short_code)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn count_all(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM url_mappings")
            .fetch_one(self.pool.as_ref())
            .await?;
        Ok(count)
    }

    async fn count_active(&self, now: DateTime<Utc>) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM url_mappings WHERE expires_at > $1")
                .bind(now)
                .fetch_one(self.pool.as_ref())
                .await?;
        Ok(count)
    }

    async fn sum_access_count(&self) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(access_count), 0)::BIGINT FROM url_mappings",
        )
        .fetch_one(self.pool.as_ref())
        .await?;
        Ok(total)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
