//! Product Catalog Domain Module
//!
//! This module contains the product search pipeline, including:
//! - Raw PA-API item models and the normalized product record
//! - Category breadcrumb extraction and item normalization
//! - Search validation and the injected catalog client seam
//! - The signed PA-API HTTP client and the search response cache

pub mod amazon;
pub mod cache;
pub mod categories;
pub mod client;
pub mod error;
pub mod models;
pub mod normalize;
pub mod search;
pub mod signing;

// Re-export commonly used types for convenience
pub use cache::SearchCache;
pub use categories::extract_categories;
pub use client::{CatalogClient, SearchQuery, UnconfiguredCatalog};
pub use error::{CatalogError, NormalizeError, ValidationError};
pub use models::{CategoryEntry, NormalizedProduct};
pub use normalize::{normalize, normalize_batch, BatchReport, ItemOutcome};
pub use search::{get_products, search_products, GetProductsRequest, SearchRequest};
