//! Integration tests for the MCP (Model Context Protocol) server
//!
//! These tests verify the complete MCP protocol implementation including:
//! - Server initialization and handshake
//! - Tool discovery and listing
//! - Tool execution (search_products, get_products, bark_like_dog, magic_tool)
//! - Validation, upstream failure and caching behaviour
//! - Error handling

use amazon_search_mcp::catalog::{CatalogClient, CatalogError, SearchQuery};
use amazon_search_mcp::router::create_app_router;
use amazon_search_mcp::state::AppState;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot`

/// In-memory catalog that counts upstream calls.
struct FakeCatalog {
    search_calls: AtomicUsize,
    get_calls: AtomicUsize,
    items: Option<Vec<Value>>,
}

impl FakeCatalog {
    fn with_items(items: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            search_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            items: Some(items),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            search_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            items: None,
        })
    }

    fn response(&self) -> Result<Vec<Value>, CatalogError> {
        self.items.clone().ok_or_else(|| CatalogError::Api {
            code: "TooManyRequests".into(),
            message: "throttled".into(),
        })
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn search_items(&self, _query: &SearchQuery) -> Result<Vec<Value>, CatalogError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.response()
    }

    async fn get_items(&self, _asins: &[String]) -> Result<Vec<Value>, CatalogError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.response()
    }
}

fn sample_items() -> Vec<Value> {
    vec![
        json!({
            "ASIN": "B0WITHEAN",
            "DetailPageURL": "https://www.amazon.es/dp/B0WITHEAN?tag=tienda-21",
            "ItemInfo": {
                "Title": { "DisplayValue": "Bombilla inteligente" },
                "ByLineInfo": { "Brand": { "DisplayValue": "Philips" } },
                "ExternalIds": { "EANs": { "DisplayValues": ["8718699673147"] } }
            },
            "Offers": { "Listings": [{ "Price": { "Amount": 12.99 } }] },
            "BrowseNodeInfo": {
                "BrowseNodes": [{
                    "Id": "leaf",
                    "ContextFreeName": "Bombillas",
                    "Ancestor": {
                        "Id": "2",
                        "ContextFreeName": "Iluminación",
                        "Ancestor": { "Id": "1", "ContextFreeName": "Hogar" }
                    }
                }]
            }
        }),
        json!({
            "ASIN": "B0NOEAN",
            "ItemInfo": { "Title": { "DisplayValue": "Sin código" } }
        }),
    ]
}

/// Helper function to create a test app instance around `catalog`
fn create_test_app(catalog: Arc<FakeCatalog>, cache_ttl: Duration) -> axum::Router {
    let state = Arc::new(AppState::new(catalog, cache_ttl));
    create_app_router(state)
}

/// Helper function to send a JSON-RPC request and get the response
async fn send_jsonrpc_request(
    app: &axum::Router,
    method: &str,
    params: Option<Value>,
    id: i32,
) -> (StatusCode, Value) {
    let request_body = json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": id
    });

    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&request_body).unwrap()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));

    (status, body)
}

async fn call_tool(app: &axum::Router, name: &str, arguments: Value, id: i32) -> (StatusCode, Value) {
    let params = json!({ "name": name, "arguments": arguments });
    send_jsonrpc_request(app, "tools/call", Some(params), id).await
}

#[tokio::test]
async fn test_mcp_sse_endpoint() {
    let app = create_test_app(FakeCatalog::with_items(vec![]), Duration::ZERO);

    let request = Request::builder()
        .method("GET")
        .uri("/mcp")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(content_type, "text/event-stream");

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_str = String::from_utf8(body_bytes.to_vec()).unwrap();
    assert!(body_str.contains("event: endpoint"));
    assert!(body_str.contains("data: /mcp"));
}

#[tokio::test]
async fn test_mcp_initialize_assigns_session() {
    let app = create_test_app(FakeCatalog::with_items(vec![]), Duration::ZERO);

    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize" }).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let session = response.headers().get("mcp-session-id").unwrap();
    assert_eq!(session.to_str().unwrap().len(), 32);

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(body["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(body["result"]["serverInfo"]["name"], "amazon-search-mcp");
}

#[tokio::test]
async fn test_mcp_tools_list() {
    let app = create_test_app(FakeCatalog::with_items(vec![]), Duration::ZERO);

    let (status, body) = send_jsonrpc_request(&app, "tools/list", None, 2).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 2);

    let tools = body["result"]["tools"].as_array().unwrap();
    let names: Vec<_> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        vec!["search_products", "get_products", "bark_like_dog", "magic_tool"]
    );

    let search = &tools[0];
    assert_eq!(search["inputSchema"]["required"], json!(["keywords"]));
    assert!(search["inputSchema"]["properties"]["search_index"]["enum"]
        .as_array()
        .unwrap()
        .contains(&json!("Electronics")));
    assert_eq!(
        search["inputSchema"]["properties"]["search_index"]["enum"]
            .as_array()
            .unwrap()
            .len(),
        39
    );

    let bark = &tools[2];
    assert_eq!(
        bark["inputSchema"]["properties"]["intensity"]["enum"],
        json!(["soft", "normal", "loud"])
    );
}

#[tokio::test]
async fn test_search_products_filters_items_without_ean() {
    let catalog = FakeCatalog::with_items(sample_items());
    let app = create_test_app(catalog.clone(), Duration::ZERO);

    let (status, body) = call_tool(&app, "search_products", json!({ "keywords": "bombilla" }), 3).await;

    assert_eq!(status, StatusCode::OK);
    let structured = &body["result"]["structuredContent"];
    assert_eq!(structured["count"], 1);

    let product = &structured["products"][0];
    assert_eq!(product["asin"], "B0WITHEAN");
    assert_eq!(product["brand"], "Philips");
    assert_eq!(product["price"], 12.99);
    assert_eq!(product["old_price"], 0.0);
    assert_eq!(product["image_url"], Value::Null);
    assert_eq!(
        product["categories"],
        json!([{ "name": "Hogar", "id": "1" }, { "name": "Iluminación", "id": "2" }])
    );

    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    let from_text: Value = serde_json::from_str(text).unwrap();
    assert_eq!(from_text, structured["products"]);
    assert_eq!(catalog.search_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_search_products_without_ean_filter_keeps_order() {
    let app = create_test_app(FakeCatalog::with_items(sample_items()), Duration::ZERO);

    let (_, body) = call_tool(
        &app,
        "search_products",
        json!({ "keywords": "bombilla", "only_with_ean": false }),
        4,
    )
    .await;

    let products = body["result"]["structuredContent"]["products"]
        .as_array()
        .unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0]["asin"], "B0WITHEAN");
    assert_eq!(products[1]["asin"], "B0NOEAN");
    assert_eq!(products[1]["eans"], json!([]));
}

#[tokio::test]
async fn test_search_products_validation_rejects_before_upstream() {
    let catalog = FakeCatalog::with_items(sample_items());
    let app = create_test_app(catalog.clone(), Duration::ZERO);

    let (_, empty) = call_tool(&app, "search_products", json!({ "keywords": "" }), 5).await;
    assert_eq!(empty["error"]["code"], -32602);
    assert_eq!(empty["error"]["message"], "Keywords must not be empty.");

    let (_, range) = call_tool(
        &app,
        "search_products",
        json!({ "keywords": "tv", "min_price": 50, "max_price": 10 }),
        6,
    )
    .await;
    assert_eq!(range["error"]["code"], -32602);
    assert!(range["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Minimum price"));

    assert_eq!(catalog.search_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_search_products_unknown_enum_is_invalid_arguments() {
    let app = create_test_app(FakeCatalog::with_items(vec![]), Duration::ZERO);

    let (_, body) = call_tool(
        &app,
        "search_products",
        json!({ "keywords": "tv", "search_index": "Spaceships" }),
        7,
    )
    .await;

    assert_eq!(body["error"]["code"], -32602);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Invalid arguments"));
}

#[tokio::test]
async fn test_search_products_upstream_failure_returns_empty() {
    let catalog = FakeCatalog::failing();
    let app = create_test_app(catalog.clone(), Duration::from_secs(60));

    let (status, body) = call_tool(&app, "search_products", json!({ "keywords": "tv" }), 8).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("error").is_none());
    assert_eq!(body["result"]["structuredContent"]["count"], 0);
    assert_eq!(body["result"]["content"][0]["text"], "[]");

    // Failures are not cached.
    call_tool(&app, "search_products", json!({ "keywords": "tv" }), 9).await;
    assert_eq!(catalog.search_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_search_products_repeated_call_uses_cache() {
    let catalog = FakeCatalog::with_items(sample_items());
    let app = create_test_app(catalog.clone(), Duration::from_secs(60));

    let (_, first) = call_tool(&app, "search_products", json!({ "keywords": "bombilla" }), 10).await;
    let (_, second) = call_tool(&app, "search_products", json!({ "keywords": "bombilla" }), 11).await;

    assert_eq!(
        first["result"]["structuredContent"],
        second["result"]["structuredContent"]
    );
    assert_eq!(catalog.search_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_get_products_tool() {
    let catalog = FakeCatalog::with_items(sample_items());
    let app = create_test_app(catalog.clone(), Duration::ZERO);

    let (_, body) = call_tool(
        &app,
        "get_products",
        json!({ "asins": ["B0WITHEAN", "B0NOEAN"] }),
        12,
    )
    .await;
    assert_eq!(body["result"]["structuredContent"]["count"], 2);

    let (_, rejected) = call_tool(&app, "get_products", json!({ "asins": [] }), 13).await;
    assert_eq!(rejected["error"]["code"], -32602);
    assert_eq!(catalog.get_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_bark_like_dog() {
    let app = create_test_app(FakeCatalog::with_items(vec![]), Duration::ZERO);

    let (_, normal) = call_tool(&app, "bark_like_dog", json!({}), 30).await;
    assert_eq!(normal["result"]["content"][0]["text"], "Woof! Woof! 🐶");
    assert_eq!(normal["result"]["isError"], false);

    let (_, soft) = call_tool(&app, "bark_like_dog", json!({ "intensity": "soft" }), 31).await;
    assert_eq!(soft["result"]["content"][0]["text"], "woof woof 🐕");

    let (_, loud) = call_tool(&app, "bark_like_dog", json!({ "intensity": "loud" }), 32).await;
    assert_eq!(loud["result"]["content"][0]["text"], "WOOF WOOF WOOF! 🐕‍🦺 BARK BARK!");

    let (_, invalid) = call_tool(&app, "bark_like_dog", json!({ "intensity": "howl" }), 33).await;
    assert_eq!(invalid["error"]["code"], -32602);
}

#[tokio::test]
async fn test_magic_tool() {
    let app = create_test_app(FakeCatalog::with_items(vec![]), Duration::ZERO);

    let (_, body) = call_tool(&app, "magic_tool", json!({ "number": 27 }), 14).await;

    assert_eq!(body["result"]["structuredContent"]["result"], 42.0);
    assert_eq!(body["result"]["content"][0]["text"], "Magic result: 27 + 15 = 42");

    let (_, invalid) = call_tool(&app, "magic_tool", json!({ "number": "many" }), 15).await;
    assert_eq!(invalid["error"]["code"], -32602);
}

#[tokio::test]
async fn test_mcp_unknown_method() {
    let app = create_test_app(FakeCatalog::with_items(vec![]), Duration::ZERO);

    let (status, body) = send_jsonrpc_request(&app, "unknown/method", None, 16).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 16);
    assert_eq!(body["error"]["code"], -32601);
    assert_eq!(body["error"]["message"], "Method not found");
}

#[tokio::test]
async fn test_mcp_tool_call_unknown_tool() {
    let app = create_test_app(FakeCatalog::with_items(vec![]), Duration::ZERO);

    let (_, body) = call_tool(&app, "unknown_tool", json!({}), 17).await;

    assert_eq!(body["error"]["code"], -32602);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Unknown tool"));
}

#[tokio::test]
async fn test_mcp_invalid_json() {
    let app = create_test_app(FakeCatalog::with_items(vec![]), Duration::ZERO);

    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(Body::from("invalid json {{{"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(body["error"]["code"], -32700);
    assert_eq!(body["error"]["message"], "Parse error");
}

#[tokio::test]
async fn test_mcp_ping_and_resources() {
    let app = create_test_app(FakeCatalog::with_items(vec![]), Duration::ZERO);

    let (_, ping) = send_jsonrpc_request(&app, "ping", None, 18).await;
    assert_eq!(ping["result"], json!({}));

    let (_, resources) = send_jsonrpc_request(&app, "resources/list", None, 19).await;
    assert_eq!(resources["result"]["resources"], json!([]));
}
