//! Catalog client seam
//!
//! The search tool never talks to the network directly; it is handed an
//! implementation of [`CatalogClient`]. Production wires in
//! [`crate::catalog::amazon::AmazonClient`], tests use in-memory fakes.

use super::error::CatalogError;
use super::models::{Availability, SearchIndex, SortBy};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Largest page PA-API returns for `SearchItems` and `GetItems`.
pub const MAX_ITEMS_PER_REQUEST: usize = 10;

/// Validated, upstream-ready search parameters. Prices are in cents.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    pub keywords: String,
    pub search_index: SearchIndex,
    pub item_count: u8,
    pub sort_by: SortBy,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub browse_node_id: Option<String>,
    pub availability: Availability,
}

/// Upstream product catalog.
///
/// Items are returned as raw JSON so that one malformed entry can be
/// rejected on its own without failing the whole response.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn search_items(&self, query: &SearchQuery) -> Result<Vec<Value>, CatalogError>;

    async fn get_items(&self, asins: &[String]) -> Result<Vec<Value>, CatalogError>;
}

/// Stand-in used when credentials are missing: every call fails with the
/// configuration problem, which the search tool turns into an empty result.
pub struct UnconfiguredCatalog {
    reason: String,
}

impl UnconfiguredCatalog {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl CatalogClient for UnconfiguredCatalog {
    async fn search_items(&self, _query: &SearchQuery) -> Result<Vec<Value>, CatalogError> {
        Err(CatalogError::NotConfigured(self.reason.clone()))
    }

    async fn get_items(&self, _asins: &[String]) -> Result<Vec<Value>, CatalogError> {
        Err(CatalogError::NotConfigured(self.reason.clone()))
    }
}
