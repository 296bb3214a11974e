//! In-process caching layer for fast redirect lookups.
//!
//! Provides [`LruCache`], a bounded map with least-recently-used eviction and
//! hit/miss accounting. Its contents live only as long as the process.

mod lru_cache;

pub use lru_cache::LruCache;
