//! Search and lookup entry points exposed to the MCP layer.
//!
//! Input validation errors are the only failures returned to the caller.
//! Upstream failures are logged and reported as an empty product list.

use super::client::{CatalogClient, SearchQuery, MAX_ITEMS_PER_REQUEST};
use super::error::ValidationError;
use super::models::{Availability, NormalizedProduct, SearchIndex, SortBy};
use super::normalize::{normalize_batch, BatchReport};
use serde::{Deserialize, Serialize};

fn default_item_count() -> i64 {
    MAX_ITEMS_PER_REQUEST as i64
}

fn default_only_with_ean() -> bool {
    true
}

/// Arguments of the `search_products` tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchRequest {
    pub keywords: String,

    /// Clamped to `1..=10`.
    #[serde(default = "default_item_count")]
    pub item_count: i64,

    #[serde(default)]
    pub search_index: SearchIndex,

    #[serde(default)]
    pub sort_by: SortBy,

    /// Currency units (e.g. euros). Zero or negative means no lower bound.
    pub min_price: Option<f64>,

    /// Currency units (e.g. euros). Zero or negative means no upper bound.
    pub max_price: Option<f64>,

    #[serde(default = "default_only_with_ean")]
    pub only_with_ean: bool,

    pub browse_node_id: Option<String>,

    #[serde(default)]
    pub availability: Availability,
}

impl SearchRequest {
    /// Builds a request with every optional argument at its default.
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            item_count: default_item_count(),
            search_index: SearchIndex::default(),
            sort_by: SortBy::default(),
            min_price: None,
            max_price: None,
            only_with_ean: default_only_with_ean(),
            browse_node_id: None,
            availability: Availability::default(),
        }
    }

    /// Checks the arguments and converts them to upstream units.
    ///
    /// # Errors
    ///
    /// * [`ValidationError::EmptyKeywords`] when keywords are blank.
    /// * [`ValidationError::PriceRange`] when the minimum exceeds the maximum.
    pub fn validate(&self) -> Result<SearchQuery, ValidationError> {
        let keywords = self.keywords.trim();
        if keywords.is_empty() {
            return Err(ValidationError::EmptyKeywords);
        }

        // Bounds are compared before conversion to cents.
        let min_bound = price_bound(self.min_price);
        let max_bound = price_bound(self.max_price);
        if let (Some(min_price), Some(max_price)) = (min_bound, max_bound) {
            if min_price > max_price {
                return Err(ValidationError::PriceRange {
                    min_price,
                    max_price,
                });
            }
        }

        let item_count = self.item_count.clamp(1, MAX_ITEMS_PER_REQUEST as i64) as u8;

        Ok(SearchQuery {
            keywords: keywords.to_string(),
            search_index: self.search_index,
            item_count,
            sort_by: self.sort_by,
            min_price: min_bound.map(to_cents),
            max_price: max_bound.map(to_cents),
            browse_node_id: self
                .browse_node_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            availability: self.availability,
        })
    }
}

/// A price bound that actually restricts the search; zero, negative or
/// absent means "no bound".
fn price_bound(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

/// Rounds a positive currency amount to cents, saturating at `u64::MAX`.
fn to_cents(value: f64) -> u64 {
    (value * 100.0).round() as u64
}

/// Runs a validated query and normalizes whatever comes back.
///
/// Upstream failures are logged and produce an empty report.
pub async fn run_search(
    client: &dyn CatalogClient,
    query: &SearchQuery,
    only_with_ean: bool,
) -> BatchReport {
    tracing::info!(
        keywords = %query.keywords,
        search_index = ?query.search_index,
        item_count = query.item_count,
        "searching catalog"
    );

    match client.search_items(query).await {
        Ok(raw_items) => normalize_batch(&raw_items, only_with_ean),
        Err(err) => {
            tracing::warn!(error = %err, "catalog search failed");
            BatchReport::default()
        }
    }
}

/// Validates `request`, queries the catalog and returns normalized products.
///
/// # Errors
///
/// Returns [`ValidationError`] before any upstream call when the arguments
/// are invalid. Every other failure yields `Ok` with an empty list.
pub async fn search_products(
    client: &dyn CatalogClient,
    request: &SearchRequest,
) -> Result<Vec<NormalizedProduct>, ValidationError> {
    let query = request.validate()?;
    Ok(run_search(client, &query, request.only_with_ean)
        .await
        .products)
}

/// Arguments of the `get_products` tool.
#[derive(Debug, Clone, Deserialize)]
pub struct GetProductsRequest {
    /// At most ten ASINs are looked up; extra ones are ignored.
    pub asins: Vec<String>,

    #[serde(default)]
    pub only_with_ean: bool,
}

/// Looks up items by ASIN and normalizes them.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyAsins`] when no usable ASIN was given.
pub async fn get_products(
    client: &dyn CatalogClient,
    request: &GetProductsRequest,
) -> Result<Vec<NormalizedProduct>, ValidationError> {
    let asins: Vec<String> = request
        .asins
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .take(MAX_ITEMS_PER_REQUEST)
        .map(str::to_string)
        .collect();

    if asins.is_empty() {
        return Err(ValidationError::EmptyAsins);
    }

    tracing::info!(?asins, "getting items");

    match client.get_items(&asins).await {
        Ok(raw_items) => Ok(normalize_batch(&raw_items, request.only_with_ean).products),
        Err(err) => {
            tracing::warn!(error = %err, "catalog lookup failed");
            Ok(Vec::new())
        }
    }
}
