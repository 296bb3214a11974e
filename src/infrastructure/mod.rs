//! Infrastructure layer for external integrations.
//!
//! # Modules
//!
//! - [`cache`] - In-process LRU cache for resolved mappings
//! - [`persistence`] - PostgreSQL repository implementations

pub mod cache;
pub mod persistence;
