//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::{CatalogService, ShortenService};
use crate::infrastructure::cache::CacheService;

#[derive(Clone)]
pub struct AppState {
    pub shorten_service: Arc<ShortenService>,
    pub catalog_service: Arc<CatalogService>,
    pub cache: Arc<dyn CacheService>,
    /// Base of returned short URLs; derived from the `Host` header when unset.
    pub public_base_url: Option<String>,
}
