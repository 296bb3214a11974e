//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{AccessRecorder, LayeredResolver, LinkService};
use crate::codegen::CodeSpec;
use crate::pool::CodePool;

/// Everything a request needs, built once in [`crate::server::run`].
///
/// Cloned per request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: CodePool,
    pub resolver: Arc<LayeredResolver>,
    pub link_service: Arc<LinkService>,
    pub access: AccessRecorder,
    pub code_spec: Arc<CodeSpec>,
    /// Public prefix for short URLs. When unset, it is derived from the
    /// request's `Host` header.
    pub base_url: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        pool: CodePool,
        resolver: Arc<LayeredResolver>,
        access: AccessRecorder,
        code_spec: CodeSpec,
        base_url: Option<String>,
    ) -> Self {
        let link_service = Arc::new(LinkService::new(pool.clone(), resolver.clone()));
        Self {
            pool,
            resolver,
            link_service,
            access,
            code_spec: Arc::new(code_spec),
            base_url: base_url.map(Arc::from),
        }
    }
}
