//! Application layer services implementing business logic.
//!
//! Services consume repository traits and the code pool and give HTTP
//! handlers a small API.
//!
//! # Available Services
//!
//! - [`services::resolver::LayeredResolver`] - Cached lookups and writes of mappings
//! - [`services::link_service::LinkService`] - Short link creation from the code pool
//! - [`services::access_worker`] - Background access counting with retries

pub mod services;
