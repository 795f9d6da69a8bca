//! Application State Management
//!
//! This module holds the state shared by every transport: the injected
//! catalog client and the search response cache.

use crate::catalog::{CatalogClient, SearchCache};
use std::{sync::Arc, time::Duration};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

/// Core application state
pub struct AppState {
    /// Upstream product catalog, injected at startup.
    pub catalog: Arc<dyn CatalogClient>,

    /// Time-boxed cache of `search_products` results.
    pub search_cache: SearchCache,
}

impl AppState {
    /// Creates a new AppState around `catalog` with the given cache TTL
    pub fn new(catalog: Arc<dyn CatalogClient>, cache_ttl: Duration) -> Self {
        tracing::info!(cache_ttl_secs = cache_ttl.as_secs(), "initializing application state");

        Self {
            catalog,
            search_cache: SearchCache::new(cache_ttl),
        }
    }
}
