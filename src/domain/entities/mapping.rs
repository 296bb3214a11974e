//! Mapping entity binding a short code to its destination URL.

use chrono::{DateTime, Utc};

/// A persisted short code mapping.
///
/// A mapping is active until `expires_at`; after that it resolves as missing
/// even though the row still exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub id: i64,
    pub short_code: String,
    pub long_url: String,
    pub access_count: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Mapping {
    /// Returns true if the mapping has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Returns true if the mapping has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Input data for creating a new mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMapping {
    pub short_code: String,
    pub long_url: String,
    pub expires_at: DateTime<Utc>,
}
