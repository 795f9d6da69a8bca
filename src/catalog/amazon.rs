//! HTTP client for the Amazon Product Advertising API 5.0.
//!
//! Wraps `reqwest` with request signing, marketplace selection and PA-API
//! error envelope handling. Retries and rate limiting are left to the API.

use super::client::{CatalogClient, SearchQuery};
use super::error::CatalogError;
use super::signing::{authorization_header, SigningRequest, CONTENT_ENCODING, CONTENT_TYPE};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::{json, Value};
use std::{fmt, str::FromStr, time::Duration};

/// Resources requested for every item; exactly what the normalizer reads.
const ITEM_RESOURCES: [&str; 9] = [
    "BrowseNodeInfo.BrowseNodes",
    "BrowseNodeInfo.BrowseNodes.Ancestor",
    "Images.Primary.Large",
    "ItemInfo.ByLineInfo",
    "ItemInfo.ExternalIds",
    "ItemInfo.Features",
    "ItemInfo.Title",
    "Offers.Listings.Price",
    "Offers.Listings.SavingBasis",
];

/// Error code PA-API returns (with HTTP 404) when a search matched nothing.
const NO_RESULTS: &str = "NoResults";

/// Associate credentials for PA-API.
#[derive(Clone)]
pub struct AmazonCredentials {
    pub access_key: String,
    pub secret_key: String,
    pub partner_tag: String,
}

impl fmt::Debug for AmazonCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmazonCredentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("partner_tag", &self.partner_tag)
            .finish()
    }
}

/// Marketplace the associate account belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Country {
    #[default]
    Spain,
    UnitedStates,
    UnitedKingdom,
    Germany,
    France,
    Italy,
}

impl Country {
    pub fn host(self) -> &'static str {
        match self {
            Country::Spain => "webservices.amazon.es",
            Country::UnitedStates => "webservices.amazon.com",
            Country::UnitedKingdom => "webservices.amazon.co.uk",
            Country::Germany => "webservices.amazon.de",
            Country::France => "webservices.amazon.fr",
            Country::Italy => "webservices.amazon.it",
        }
    }

    pub fn region(self) -> &'static str {
        match self {
            Country::UnitedStates => "us-east-1",
            _ => "eu-west-1",
        }
    }

    pub fn marketplace(self) -> &'static str {
        match self {
            Country::Spain => "www.amazon.es",
            Country::UnitedStates => "www.amazon.com",
            Country::UnitedKingdom => "www.amazon.co.uk",
            Country::Germany => "www.amazon.de",
            Country::France => "www.amazon.fr",
            Country::Italy => "www.amazon.it",
        }
    }
}

impl FromStr for Country {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ES" => Ok(Country::Spain),
            "US" => Ok(Country::UnitedStates),
            "UK" | "GB" => Ok(Country::UnitedKingdom),
            "DE" => Ok(Country::Germany),
            "FR" => Ok(Country::France),
            "IT" => Ok(Country::Italy),
            other => Err(format!("unsupported country code '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    SearchItems,
    GetItems,
}

impl Operation {
    fn path(self) -> &'static str {
        match self {
            Operation::SearchItems => "paapi5/searchitems",
            Operation::GetItems => "paapi5/getitems",
        }
    }

    fn target(self) -> &'static str {
        match self {
            Operation::SearchItems => "com.amazon.paapi5.v1.ProductAdvertisingAPIv1.SearchItems",
            Operation::GetItems => "com.amazon.paapi5.v1.ProductAdvertisingAPIv1.GetItems",
        }
    }

    /// Key of the result object holding `Items` in a successful response.
    fn result_key(self) -> &'static str {
        match self {
            Operation::SearchItems => "SearchResult",
            Operation::GetItems => "ItemsResult",
        }
    }
}

/// Signed PA-API client.
///
/// Use [`AmazonClient::new`] for production or [`AmazonClient::with_base_url`]
/// to point at a mock server in tests.
pub struct AmazonClient {
    client: Client,
    credentials: AmazonCredentials,
    country: Country,
    base_url: Url,
}

impl AmazonClient {
    /// Creates a client for the marketplace's production endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        credentials: AmazonCredentials,
        country: Country,
        timeout_secs: u64,
    ) -> Result<Self, CatalogError> {
        let base_url = format!("https://{}/", country.host());
        Self::with_base_url(credentials, country, timeout_secs, &base_url)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`CatalogError::NotConfigured`] if `base_url` is invalid.
    pub fn with_base_url(
        credentials: AmazonCredentials,
        country: Country,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| {
            CatalogError::NotConfigured(format!("invalid base URL '{base_url}': {e}"))
        })?;

        Ok(Self {
            client,
            credentials,
            country,
            base_url,
        })
    }

    fn common_fields(&self) -> serde_json::Map<String, Value> {
        let mut fields = serde_json::Map::new();
        fields.insert("PartnerTag".into(), json!(self.credentials.partner_tag));
        fields.insert("PartnerType".into(), json!("Associates"));
        fields.insert("Marketplace".into(), json!(self.country.marketplace()));
        fields.insert("Resources".into(), json!(ITEM_RESOURCES));
        fields
    }

    /// Request body for `SearchItems`.
    pub fn search_body(&self, query: &SearchQuery) -> Value {
        let mut body = self.common_fields();
        body.insert("Keywords".into(), json!(query.keywords));
        body.insert("SearchIndex".into(), json!(query.search_index));
        body.insert("ItemCount".into(), json!(query.item_count));
        body.insert("SortBy".into(), json!(query.sort_by));
        body.insert("Availability".into(), json!(query.availability));
        if let Some(min) = query.min_price {
            body.insert("MinPrice".into(), json!(min));
        }
        if let Some(max) = query.max_price {
            body.insert("MaxPrice".into(), json!(max));
        }
        if let Some(node) = &query.browse_node_id {
            body.insert("BrowseNodeId".into(), json!(node));
        }
        Value::Object(body)
    }

    /// Request body for `GetItems`.
    pub fn get_items_body(&self, asins: &[String]) -> Value {
        let mut body = self.common_fields();
        body.insert("ItemIds".into(), json!(asins));
        body.insert("ItemIdType".into(), json!("ASIN"));
        Value::Object(body)
    }

    /// `host[:port]` exactly as reqwest will send it in the `Host` header.
    fn host_header(url: &Url) -> String {
        let host = url.host_str().unwrap_or_default();
        match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    async fn execute(&self, operation: Operation, body: Value) -> Result<Vec<Value>, CatalogError> {
        let url = self.base_url.join(operation.path()).map_err(|e| {
            CatalogError::NotConfigured(format!("invalid request path: {e}"))
        })?;
        let payload = body.to_string();
        let amz_date = chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let host = Self::host_header(&url);

        let authorization = authorization_header(&SigningRequest {
            access_key: &self.credentials.access_key,
            secret_key: &self.credentials.secret_key,
            region: self.country.region(),
            host: &host,
            path: url.path(),
            target: operation.target(),
            payload: &payload,
            amz_date: &amz_date,
        })?;

        tracing::debug!(?operation, %url, "sending PA-API request");

        let response = self
            .client
            .post(url)
            .header("content-encoding", CONTENT_ENCODING)
            .header("content-type", CONTENT_TYPE)
            .header("x-amz-date", &amz_date)
            .header("x-amz-target", operation.target())
            .header("authorization", authorization)
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return match first_api_error(&text) {
                Some((code, _)) if code == NO_RESULTS => Ok(Vec::new()),
                Some((code, message)) => Err(CatalogError::Api { code, message }),
                None => Err(CatalogError::Status {
                    status: status.as_u16(),
                    body: text,
                }),
            };
        }

        let body: Value =
            serde_json::from_str(&text).map_err(|source| CatalogError::Deserialize {
                context: format!("{operation:?} response"),
                source,
            })?;

        if let Some(errors) = body.get("Errors") {
            tracing::warn!(?operation, %errors, "PA-API returned partial errors");
        }

        Ok(body
            .get(operation.result_key())
            .and_then(|r| r.get("Items"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }
}

/// Extracts `(Code, Message)` of the first entry of a PA-API error envelope.
fn first_api_error(text: &str) -> Option<(String, String)> {
    let body: Value = serde_json::from_str(text).ok()?;
    let first = body.get("Errors")?.as_array()?.first()?;
    let code = first.get("Code")?.as_str()?.to_string();
    let message = first
        .get("Message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some((code, message))
}

#[async_trait]
impl CatalogClient for AmazonClient {
    async fn search_items(&self, query: &SearchQuery) -> Result<Vec<Value>, CatalogError> {
        let items = self
            .execute(Operation::SearchItems, self.search_body(query))
            .await?;
        if items.is_empty() {
            tracing::warn!(keywords = %query.keywords, "no items found for the given search criteria");
        }
        Ok(items)
    }

    async fn get_items(&self, asins: &[String]) -> Result<Vec<Value>, CatalogError> {
        let items = self
            .execute(Operation::GetItems, self.get_items_body(asins))
            .await?;
        if items.is_empty() {
            tracing::warn!(?asins, "no items found for the given ASINs");
        }
        Ok(items)
    }
}
