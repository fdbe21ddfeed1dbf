//! HTTP API for the email assistant.
//!
//! ## Endpoints
//!
//! - `POST /mcp` - JSON-RPC messages (single or batch), bearer auth
//! - `DELETE /mcp` - End an MCP session, bearer auth
//! - `GET /mcp` - 405, server-initiated streams are not offered
//! - `GET /health` - Health check

mod auth;
mod routes;
mod sessions;

pub use routes::{router, serve, AppState, SESSION_HEADER};
pub use sessions::SessionStore;
