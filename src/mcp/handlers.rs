//! MCP (Model Context Protocol) route handlers
//!
//! This module implements the Model Context Protocol handlers for the product
//! search server. `dispatch` is shared by the HTTP and stdio transports, and
//! `handle_tool_call` is public to make it accessible for tests.

use super::{helpers::*, models::*};
use crate::catalog::models::{Availability, SearchIndex, SortBy};
use crate::catalog::{
    get_products, GetProductsRequest, NormalizedProduct, SearchRequest, ValidationError,
};
use crate::state::{AppState, SharedState};
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

/// Failure of a single `tools/call`, reported as JSON-RPC `-32602`.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Creates routes for MCP-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/", post(handle_mcp).get(handle_mcp_sse))
        .route("/mcp", post(handle_mcp).get(handle_mcp_sse)) // Standard endpoint
        .route("/mcp/", post(handle_mcp).get(handle_mcp_sse)) // Trailing slash safety
}

/// Handle SSE (Server-Sent Events) handshake for GET requests
async fn handle_mcp_sse() -> impl IntoResponse {
    (
        [("content-type", "text/event-stream")],
        "event: endpoint\ndata: /mcp\n\n",
    )
}

/// Endpoint: POST /mcp
/// Handles the Model Context Protocol communication for POST requests.
async fn handle_mcp(
    State(state): State<SharedState>,
    body: Result<Json<JsonRpcRequest>, axum::extract::rejection::JsonRejection>,
) -> impl IntoResponse {
    let req = match body {
        Ok(Json(r)) => r,
        Err(e) => {
            tracing::warn!(error = %e.body_text(), "JSON parse error");
            return (
                StatusCode::BAD_REQUEST,
                Json(rpc_error(Value::Null, -32700, "Parse error")),
            )
                .into_response();
        }
    };

    let is_initialize = req.method == "initialize";
    let mut response = Json(dispatch(&state, req).await).into_response();

    if is_initialize {
        let session_id = Uuid::new_v4().simple().to_string();
        if let Ok(value) = HeaderValue::from_str(&session_id) {
            response.headers_mut().insert(SESSION_HEADER, value);
        }
    }

    response
}

/// Routes one JSON-RPC request to its method handler.
pub async fn dispatch(state: &AppState, req: JsonRpcRequest) -> Value {
    let id = req.id.unwrap_or(Value::Null);
    let method_name = req.method.as_str();
    let params = req.params.unwrap_or(Value::Null);

    tracing::info!(method = method_name, id = %id, "MCP call");

    match method_name {
        "initialize" => rpc_success(id, handle_initialize()),
        "notifications/initialized" => rpc_success(id, json!({})),
        "tools/list" => rpc_success(id, handle_tools_list()),
        "resources/list" => rpc_success(id, json!({ "resources": [] })),
        "tools/call" => {
            let tool_name = params.get("name").and_then(|n| n.as_str()).unwrap_or("");
            let args = params.get("arguments").cloned().unwrap_or(json!({}));

            match handle_tool_call(state, tool_name, args).await {
                Ok(result) => rpc_success(id, result),
                Err(err) => rpc_error(id, -32602, err.to_string()),
            }
        }
        "ping" => rpc_success(id, json!({})),
        _ => {
            tracing::warn!(method = method_name, "unknown method");
            rpc_error(id, -32601, "Method not found")
        }
    }
}

// =============================================================================
// MCP Method Handlers
// =============================================================================

/// Handles `initialize` request (Handshake).
fn handle_initialize() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": { "listChanged": false }
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

/// Handles `tools/list` request.
fn handle_tools_list() -> Value {
    json!({
        "tools": [
            {
                "name": SEARCH_TOOL_NAME,
                "title": "Search Amazon products",
                "description": "Searches the Amazon catalog and returns flattened product records \
                                (price, discount, brand, image, EANs and category path).",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "keywords": { "type": "string", "description": "Keywords to search for." },
                        "item_count": { "type": "integer", "minimum": 1, "maximum": 10, "default": 10 },
                        "search_index": {
                            "type": "string",
                            "enum": SearchIndex::ALL_VALUES,
                            "default": "All"
                        },
                        "sort_by": {
                            "type": "string",
                            "enum": SortBy::ALL_VALUES,
                            "default": "Relevance"
                        },
                        "min_price": { "type": "number", "description": "Minimum price in currency units." },
                        "max_price": { "type": "number", "description": "Maximum price in currency units." },
                        "only_with_ean": { "type": "boolean", "default": true },
                        "browse_node_id": { "type": "string" },
                        "availability": {
                            "type": "string",
                            "enum": Availability::ALL_VALUES,
                            "default": "Available"
                        }
                    },
                    "required": ["keywords"]
                }
            },
            {
                "name": GET_PRODUCTS_TOOL_NAME,
                "title": "Get Amazon products by ASIN",
                "description": "Looks up up to 10 products by ASIN and returns flattened product records.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "asins": { "type": "array", "items": { "type": "string" }, "maxItems": 10 },
                        "only_with_ean": { "type": "boolean", "default": false }
                    },
                    "required": ["asins"]
                }
            },
            {
                "name": BARK_TOOL_NAME,
                "title": "Bark like a dog",
                "description": "Barks like a dog.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "intensity": {
                            "type": "string",
                            "enum": BarkIntensity::ALL_VALUES,
                            "default": "normal"
                        }
                    },
                    "required": []
                }
            },
            {
                "name": MAGIC_TOOL_NAME,
                "title": "Magic tool",
                "description": "Adds 15 to the given number.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "number": { "type": "number" }
                    },
                    "required": ["number"]
                }
            }
        ]
    })
}

/// Handles `tools/call` request (Business Logic).
///
/// Every call is logged before and after execution.
pub async fn handle_tool_call(state: &AppState, name: &str, args: Value) -> Result<Value, ToolError> {
    tracing::info!(tool = name, arguments = %args, "about to call tool");

    let result = match name {
        SEARCH_TOOL_NAME => handle_search_tool(state, args).await,
        GET_PRODUCTS_TOOL_NAME => handle_get_products_tool(state, args).await,
        BARK_TOOL_NAME => handle_bark_tool(args),
        MAGIC_TOOL_NAME => handle_magic_tool(args),
        _ => Err(ToolError::UnknownTool(name.to_string())),
    };

    match &result {
        Ok(value) => {
            let count = value
                .get("structuredContent")
                .and_then(|s| s.get("count"))
                .and_then(Value::as_u64);
            tracing::info!(
                tool = name,
                result_bytes = value.to_string().len(),
                ?count,
                "tool call completed"
            )
        }
        Err(err) => tracing::warn!(tool = name, error = %err, "tool call rejected"),
    }

    result
}

/// Handles the search_products tool functionality
async fn handle_search_tool(state: &AppState, args: Value) -> Result<Value, ToolError> {
    let request: SearchRequest = serde_json::from_value(args)?;

    let products = state
        .search_cache
        .search(state.catalog.as_ref(), &request)
        .await?;

    Ok(products_result(products))
}

/// Handles the get_products tool functionality
async fn handle_get_products_tool(state: &AppState, args: Value) -> Result<Value, ToolError> {
    let request: GetProductsRequest = serde_json::from_value(args)?;

    let products = get_products(state.catalog.as_ref(), &request).await?;

    Ok(products_result(products))
}

/// Wraps a product list as a tool result: the JSON list as text for clients
/// that only read `content`, plus the same list as structured content.
fn products_result(products: Vec<NormalizedProduct>) -> Value {
    let count = products.len();
    let products = json!(products);

    tool_result(
        products.to_string(),
        Some(json!({ "count": count, "products": products })),
    )
}

/// Handles the bark_like_dog tool functionality
fn handle_bark_tool(args: Value) -> Result<Value, ToolError> {
    let input: BarkToolInput = serde_json::from_value(args)?;
    tracing::info!(intensity = ?input.intensity, "barking");

    Ok(tool_result(input.intensity.bark(), None))
}

/// Handles the magic_tool functionality
fn handle_magic_tool(args: Value) -> Result<Value, ToolError> {
    let input: MagicToolInput = serde_json::from_value(args)?;

    let result = input.number + MAGIC_INCREMENT;
    let message = format!("Magic result: {} + 15 = {}", input.number, result);
    tracing::info!(%message, "magic operation");

    Ok(tool_result(message, Some(json!({ "result": result }))))
}
