//! Domain layer containing business entities and repository contracts.
//!
//! Nothing here depends on the database, the HTTP layer or the code pool.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`access_event`] - Access tracking event model
//!
//! # Access Tracking Flow
//!
//! 1. The redirect handler resolves a code
//! 2. An [`access_event::AccessEvent`] is queued without waiting
//! 3. [`crate::application::services::run_access_worker`] applies it with retries
//! 4. The counter is persisted via [`repositories::MappingRepository`]

pub mod access_event;
pub mod entities;
pub mod repositories;
