//! DTOs for the statistics endpoint.

use serde::Serialize;

/// Store-wide mapping counters plus cache and pool state.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_urls: i64,
    pub active_urls: i64,
    pub expired_urls: i64,
    pub total_access: i64,
    /// Fraction of cache lookups that were hits, between 0 and 1.
    pub cache_hit_rate: f64,
    pub cache_size: usize,
    pub pool_available: usize,
    pub pool_loading: bool,
}
