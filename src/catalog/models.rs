//! Catalog Domain Models
//!
//! This module contains the raw Product Advertising API item shapes, the
//! flattened product record handed to MCP clients, and the enums accepted by
//! the search tool.

use serde::{Deserialize, Serialize};

// =============================================================================
// Raw PA-API Item
// =============================================================================

/// A single search or lookup result as returned by PA-API 5.0.
///
/// Every level is optional: the API omits whole branches when a resource was
/// not requested or has no data for the item.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogItem {
    #[serde(rename = "ASIN")]
    pub asin: Option<String>,

    #[serde(rename = "DetailPageURL")]
    pub detail_page_url: Option<String>,

    pub item_info: Option<ItemInfo>,
    pub images: Option<Images>,
    pub offers: Option<Offers>,
    pub browse_node_info: Option<BrowseNodeInfo>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ItemInfo {
    pub title: Option<DisplayValue>,
    pub features: Option<DisplayValues>,
    pub by_line_info: Option<ByLineInfo>,
    pub external_ids: Option<ExternalIds>,
}

/// Single-valued attribute wrapper (`{"DisplayValue": ...}`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DisplayValue {
    pub display_value: Option<String>,
}

/// Multi-valued attribute wrapper (`{"DisplayValues": [...]}`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DisplayValues {
    pub display_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ByLineInfo {
    pub brand: Option<DisplayValue>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ExternalIds {
    #[serde(rename = "EANs")]
    pub eans: Option<DisplayValues>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Images {
    pub primary: Option<ImageVariants>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ImageVariants {
    pub large: Option<Image>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Image {
    #[serde(rename = "URL")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Offers {
    pub listings: Option<Vec<Listing>>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Listing {
    pub price: Option<Price>,
    pub saving_basis: Option<Money>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Price {
    pub amount: Option<f64>,
    pub savings: Option<Savings>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Savings {
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Money {
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct BrowseNodeInfo {
    pub browse_nodes: Option<Vec<BrowseNode>>,
}

/// A node of the catalog category tree, linked upward through `ancestor`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct BrowseNode {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub context_free_name: Option<String>,
    pub ancestor: Option<Box<BrowseNode>>,
}

impl BrowseNode {
    /// Locale-independent name, falling back to the display name.
    pub fn name(&self) -> Option<&str> {
        self.context_free_name
            .as_deref()
            .or(self.display_name.as_deref())
    }
}

// =============================================================================
// Normalized Output
// =============================================================================

/// One step of a product's category breadcrumb.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryEntry {
    pub name: String,
    pub id: String,
}

/// Flat, null-safe product record returned by the search tools.
///
/// `old_price` and `discount` use `0` for "unknown"; `price`, `image_url` and
/// `brand` serialize as `null` when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedProduct {
    pub title: String,
    pub asin: String,
    pub affiliate_link: String,
    pub price: Option<f64>,
    pub old_price: f64,
    pub image_url: Option<String>,
    pub description: String,
    /// Reserved for a downstream enrichment step; always empty here.
    pub features: String,
    pub brand: Option<String>,
    pub discount: f64,
    pub categories: Vec<CategoryEntry>,
    pub eans: Vec<String>,
}

// =============================================================================
// Search Enums
// =============================================================================

/// Catalog department to search in (Spanish marketplace names).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SearchIndex {
    #[default]
    All,
    AlexaSkills,
    AmazonVideo,
    Appliances,
    AppsGames,
    Automotive,
    Baby,
    Beauty,
    Books,
    Classical,
    ClothingAccessories,
    Collectibles,
    Computers,
    DigitalMusic,
    Electronics,
    EverythingElse,
    Fashion,
    GardenAndOutdoor,
    GiftCards,
    GroceryAndGourmetFood,
    Handmade,
    HealthPersonalCare,
    HomeAndKitchen,
    Industrial,
    KindleStore,
    Luggage,
    LuxuryBeauty,
    Magazines,
    MoviesTV,
    Music,
    MusicalInstruments,
    OfficeProducts,
    PetSupplies,
    Photo,
    Software,
    SportsOutdoors,
    ToolsAndHomeImprovement,
    ToysAndGames,
    VideoGames,
}

impl SearchIndex {
    /// Every accepted value, in the order advertised in the tool schema.
    pub const ALL_VALUES: &'static [&'static str] = &[
        "All",
        "AlexaSkills",
        "AmazonVideo",
        "Appliances",
        "AppsGames",
        "Automotive",
        "Baby",
        "Beauty",
        "Books",
        "Classical",
        "ClothingAccessories",
        "Collectibles",
        "Computers",
        "DigitalMusic",
        "Electronics",
        "EverythingElse",
        "Fashion",
        "GardenAndOutdoor",
        "GiftCards",
        "GroceryAndGourmetFood",
        "Handmade",
        "HealthPersonalCare",
        "HomeAndKitchen",
        "Industrial",
        "KindleStore",
        "Luggage",
        "LuxuryBeauty",
        "Magazines",
        "MoviesTV",
        "Music",
        "MusicalInstruments",
        "OfficeProducts",
        "PetSupplies",
        "Photo",
        "Software",
        "SportsOutdoors",
        "ToolsAndHomeImprovement",
        "ToysAndGames",
        "VideoGames",
    ];
}

/// Result ordering understood by `SearchItems`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SortBy {
    AvgCustomerReviews,
    Featured,
    NewestArrivals,
    #[serde(rename = "Price:HighToLow")]
    PriceHighToLow,
    #[serde(rename = "Price:LowToHigh")]
    PriceLowToHigh,
    #[default]
    Relevance,
}

impl SortBy {
    pub const ALL_VALUES: &'static [&'static str] = &[
        "AvgCustomerReviews",
        "Featured",
        "NewestArrivals",
        "Price:HighToLow",
        "Price:LowToHigh",
        "Relevance",
    ];
}

/// Stock filter applied upstream.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Availability {
    #[default]
    Available,
    IncludeOutOfStock,
}

impl Availability {
    pub const ALL_VALUES: &'static [&'static str] = &["Available", "IncludeOutOfStock"];
}
