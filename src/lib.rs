//! Amazon Product Search MCP Library
//!
//! This library provides an MCP (Model Context Protocol) server exposing an
//! Amazon product search tool, backed by a normalization pipeline that turns
//! Product Advertising API items into flat product records.

// Domain modules
pub mod catalog;
pub mod mcp;

// Infrastructure
pub mod config;
pub mod router;
pub mod state;
