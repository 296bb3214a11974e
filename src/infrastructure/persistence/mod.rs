//! PostgreSQL repository implementations.
//!
//! # Repositories
//!
//! - [`PgMappingRepository`] - Short code mapping storage and counters

pub mod pg_mapping_repository;

pub use pg_mapping_repository::PgMappingRepository;
