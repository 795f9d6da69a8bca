//! MCP Protocol Models and Constants
//!
//! This module contains all data structures and constants related to the
//! Model Context Protocol (MCP) specification.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// MCP Constants
// =============================================================================

/// Name of the product search tool
pub const SEARCH_TOOL_NAME: &str = "search_products";
/// Name of the ASIN lookup tool
pub const GET_PRODUCTS_TOOL_NAME: &str = "get_products";
/// Name of the arithmetic demo tool
pub const MAGIC_TOOL_NAME: &str = "magic_tool";
/// Name of the barking demo tool
pub const BARK_TOOL_NAME: &str = "bark_like_dog";
/// Server identifier
pub const SERVER_NAME: &str = "amazon-search-mcp";
/// Protocol version for MCP
pub const PROTOCOL_VERSION: &str = "2024-11-05";
/// Header carrying the session assigned on `initialize` (HTTP transport)
pub const SESSION_HEADER: &str = "mcp-session-id";
/// Amount added by the magic tool
pub const MAGIC_INCREMENT: f64 = 15.0;

// =============================================================================
// MCP Protocol Models
// =============================================================================

/// Standard JSON-RPC 2.0 Request envelope
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version (should be "2.0")
    #[allow(dead_code)]
    pub jsonrpc: Option<String>,

    /// Method name to invoke
    pub method: String,

    /// Parameters for the method
    pub params: Option<Value>,

    /// Request identifier; absent for notifications
    pub id: Option<Value>,
}

impl JsonRpcRequest {
    /// Notifications expect no response on streaming transports.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Input for the magic tool
#[derive(Debug, Deserialize)]
pub struct MagicToolInput {
    pub number: f64,
}

/// How loud `bark_like_dog` barks
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BarkIntensity {
    Soft,
    #[default]
    Normal,
    Loud,
}

impl BarkIntensity {
    pub const ALL_VALUES: &'static [&'static str] = &["soft", "normal", "loud"];

    pub fn bark(self) -> &'static str {
        match self {
            Self::Soft => "woof woof 🐕",
            Self::Normal => "Woof! Woof! 🐶",
            Self::Loud => "WOOF WOOF WOOF! 🐕‍🦺 BARK BARK!",
        }
    }
}

/// Input for the bark tool
#[derive(Debug, Deserialize)]
pub struct BarkToolInput {
    #[serde(default)]
    pub intensity: BarkIntensity,
}
