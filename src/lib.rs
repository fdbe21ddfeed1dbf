//! # AI Email Assistant Suite
//!
//! MCP server that offers email drafting tools backed by Google Gemini.
//!
//! This library provides:
//! - Prompt templates for tone analysis, rewriting, shortening and
//!   bullet-point expansion
//! - A Gemini `generateContent` client behind the `LlmClient` trait
//! - An MCP (JSON-RPC 2.0) server exposing the operations as tools
//! - The HTTP transport with static bearer-token auth
//!
//! ## Request Flow
//!
//! ```text
//!   POST /mcp ──► bearer auth ──► JSON-RPC dispatch ──► tool
//!                                                        │
//!                                  prompt template ◄─────┘
//!                                        │
//!                                        ▼
//!                             Gemini generateContent
//!                                        │
//!                                        ▼
//!                            completion text, unmodified
//! ```
//!
//! ## Modules
//! - `prompts`: instruction templates
//! - `assistant`: the four operations plus `validate`
//! - `llm`: upstream model client
//! - `mcp`: JSON-RPC method and tool dispatch
//! - `api`: HTTP routes, auth and MCP sessions

pub mod api;
pub mod assistant;
pub mod config;
pub mod llm;
pub mod mcp;
pub mod prompts;

pub use assistant::{EmailAssistant, UpstreamError};
pub use config::Config;
