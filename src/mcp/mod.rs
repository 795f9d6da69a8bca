//! Model Context Protocol (MCP) Module
//!
//! This module contains all MCP protocol implementation, including:
//! - Protocol models (JsonRpcRequest, constants)
//! - RPC helpers (success/error responses, tool results)
//! - MCP handlers (initialize, tools/list, tools/call, etc.)
//! - The stdio transport

pub mod handlers;
pub mod helpers;
pub mod models;
pub mod stdio;

// Re-export commonly used types and functions
pub use handlers::{dispatch, routes};
pub use stdio::serve_stdio;
