//! Time-boxed response cache around [`search_products`].
//!
//! Keyed by the validated query plus the EAN flag, so two calls that differ
//! only in whitespace or in an out-of-range `item_count` share an entry.

use super::client::{CatalogClient, SearchQuery};
use super::error::ValidationError;
use super::models::NormalizedProduct;
use super::search::{search_products, SearchRequest};
use dashmap::DashMap;
use std::time::{Duration, Instant};

type CacheKey = (SearchQuery, bool);

/// In-memory search result cache.
pub struct SearchCache {
    /// DashMap allows concurrent tool calls without external Mutexes.
    entries: DashMap<CacheKey, (Instant, Vec<NormalizedProduct>)>,
    ttl: Duration,
}

impl SearchCache {
    /// A zero `ttl` disables caching.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a fresh cached result or runs the search and stores it.
    ///
    /// Empty results are never stored, so an upstream outage is not served
    /// from cache once the catalog recovers.
    ///
    /// # Errors
    ///
    /// Propagates [`ValidationError`] from the request; nothing is cached.
    pub async fn search(
        &self,
        client: &dyn CatalogClient,
        request: &SearchRequest,
    ) -> Result<Vec<NormalizedProduct>, ValidationError> {
        if self.ttl.is_zero() {
            return search_products(client, request).await;
        }

        let key = (request.validate()?, request.only_with_ean);

        if let Some(entry) = self.entries.get(&key) {
            let (stored_at, products) = entry.value();
            if stored_at.elapsed() < self.ttl {
                tracing::debug!(keywords = %key.0.keywords, "search cache hit");
                return Ok(products.clone());
            }
        }
        self.purge_expired();

        let products = search_products(client, request).await?;
        if !products.is_empty() {
            self.entries
                .insert(key, (Instant::now(), products.clone()));
        }
        Ok(products)
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
    }
}
