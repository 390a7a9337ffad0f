//! Azure Logs MCP Server Library
//!
//! This library provides MCP (Model Context Protocol) tools for AI assistants
//! to run KQL queries against Azure Log Analytics workspaces.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::LogsError;
pub use mcp::LogsService;
