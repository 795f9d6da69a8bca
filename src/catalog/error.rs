use thiserror::Error;

/// Rejected tool input. These are the only failures that reach the caller.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Keywords must not be empty.")]
    EmptyKeywords,

    #[error("Minimum price cannot be greater than maximum price.")]
    PriceRange { min_price: f64, max_price: f64 },

    #[error("At least one ASIN is required.")]
    EmptyAsins,
}

/// Failure talking to the upstream catalog. Absorbed into an empty result.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("PA-API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("request signing failed: {0}")]
    Signing(String),

    #[error("catalog client is not configured: {0}")]
    NotConfigured(String),
}

/// A single raw item that could not be decoded. The item is dropped.
#[derive(Debug, Error)]
#[error("item {asin} could not be decoded: {source}")]
pub struct NormalizeError {
    pub asin: String,
    #[source]
    pub source: serde_json::Error,
}
