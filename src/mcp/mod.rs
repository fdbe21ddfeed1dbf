//! Model Context Protocol server.
//!
//! Exposes the email operations as MCP tools over JSON-RPC 2.0. The HTTP
//! transport lives in [`crate::api`]; this module only maps messages to
//! responses.

mod server;
mod tools;
pub mod types;

pub use server::McpServer;
pub use tools::{call_tool, tool_definitions, ToolError};
