//! Core domain entities.
//!
//! - [`Mapping`] - A stored short code to destination URL mapping
//! - [`NewMapping`] - Input for creating one

pub mod mapping;

pub use mapping::{Mapping, NewMapping};
