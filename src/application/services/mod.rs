//! Business logic services for the application layer.

pub mod access_worker;
pub mod link_service;
pub mod resolver;

pub use access_worker::{AccessRecorder, run_access_worker};
pub use link_service::LinkService;
pub use resolver::{LayeredResolver, Stats};
