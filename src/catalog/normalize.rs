//! Normalization from raw PA-API items to [`NormalizedProduct`].
//!
//! Every field is read with safe navigation: a missing link anywhere along
//! the nested path yields that field's default instead of an error.

use super::categories::extract_categories;
use super::error::NormalizeError;
use super::models::{CatalogItem, Listing, NormalizedProduct};
use serde::Deserialize;
use serde_json::Value;

/// Separator placed between feature bullet lines in `description`.
pub const FEATURE_SEPARATOR: &str = " ||| ";

/// What happened to one raw item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Kept(NormalizedProduct),
    /// Dropped by the EAN filter.
    Skipped { asin: String },
}

/// Aggregated result of [`normalize_batch`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Surviving products in input order.
    pub products: Vec<NormalizedProduct>,
    /// ASINs dropped because they carried no EAN.
    pub skipped: Vec<String>,
    /// Items that could not be decoded at all.
    pub failed: Vec<NormalizeError>,
}

/// Flattens a decoded item. Never fails; missing data falls back to defaults.
pub fn normalize_item(item: &CatalogItem) -> NormalizedProduct {
    let info = item.item_info.as_ref();
    let listing = first_listing(item);

    let title = info
        .and_then(|i| i.title.as_ref())
        .and_then(|t| t.display_value.clone())
        .unwrap_or_default();

    let price = listing
        .and_then(|l| l.price.as_ref())
        .and_then(|p| p.amount)
        .filter(|amount| *amount > 0.0);

    let discount = listing
        .and_then(|l| l.price.as_ref())
        .and_then(|p| p.savings.as_ref())
        .and_then(|s| s.percentage)
        .filter(|pct| *pct > 0.0)
        .unwrap_or(0.0);

    let old_price = listing
        .and_then(|l| l.saving_basis.as_ref())
        .and_then(|b| b.amount)
        .filter(|amount| *amount > 0.0)
        .unwrap_or(0.0);

    let description = info
        .and_then(|i| i.features.as_ref())
        .and_then(|f| f.display_values.as_ref())
        .map(|lines| lines.join(FEATURE_SEPARATOR))
        .unwrap_or_default();

    let brand = info
        .and_then(|i| i.by_line_info.as_ref())
        .and_then(|b| b.brand.as_ref())
        .and_then(|b| b.display_value.clone());

    let image_url = item
        .images
        .as_ref()
        .and_then(|i| i.primary.as_ref())
        .and_then(|p| p.large.as_ref())
        .and_then(|l| l.url.clone());

    let eans = info
        .and_then(|i| i.external_ids.as_ref())
        .and_then(|e| e.eans.as_ref())
        .and_then(|e| e.display_values.clone())
        .unwrap_or_default();

    NormalizedProduct {
        title,
        asin: item.asin.clone().unwrap_or_default(),
        affiliate_link: item.detail_page_url.clone().unwrap_or_default(),
        price,
        old_price,
        image_url,
        description,
        features: String::new(),
        brand,
        discount,
        categories: extract_categories(item.browse_node_info.as_ref()),
        eans,
    }
}

fn first_listing(item: &CatalogItem) -> Option<&Listing> {
    item.offers
        .as_ref()
        .and_then(|o| o.listings.as_ref())
        .and_then(|l| l.first())
}

/// Decodes and normalizes one raw item, applying the EAN filter.
///
/// # Errors
///
/// Returns [`NormalizeError`] when the raw JSON does not match the item shape
/// (for example a string where a number is expected).
pub fn normalize(raw: &Value, only_with_ean: bool) -> Result<ItemOutcome, NormalizeError> {
    let item = CatalogItem::deserialize(raw).map_err(|source| NormalizeError {
        asin: raw_asin(raw),
        source,
    })?;

    let product = normalize_item(&item);
    if only_with_ean && product.eans.is_empty() {
        return Ok(ItemOutcome::Skipped {
            asin: product.asin,
        });
    }

    Ok(ItemOutcome::Kept(product))
}

/// Best-effort ASIN for log lines about items that failed to decode.
fn raw_asin(raw: &Value) -> String {
    raw.get("ASIN")
        .and_then(Value::as_str)
        .unwrap_or("<unknown>")
        .to_string()
}

/// Normalizes every item in order, dropping skipped and undecodable ones.
///
/// Never fails as a whole: an empty input or a batch where every item was
/// filtered out yields an empty `products` list.
pub fn normalize_batch(raw_items: &[Value], only_with_ean: bool) -> BatchReport {
    let mut report = BatchReport::default();

    for raw in raw_items {
        match normalize(raw, only_with_ean) {
            Ok(ItemOutcome::Kept(product)) => report.products.push(product),
            Ok(ItemOutcome::Skipped { asin }) => {
                tracing::info!(%asin, "skipping item due to no EANs");
                report.skipped.push(asin);
            }
            Err(err) => {
                tracing::warn!(asin = %err.asin, error = %err, "dropping malformed item");
                report.failed.push(err);
            }
        }
    }

    if report.products.is_empty() {
        tracing::info!("no items found for the given search criteria");
    } else {
        tracing::info!(
            count = report.products.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "found items matching the search criteria"
        );
    }

    report
}
