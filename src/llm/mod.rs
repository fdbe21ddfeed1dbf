//! LLM client module for interacting with language models.
//!
//! This module provides a trait-based abstraction over the text-generation
//! provider, with Google Gemini as the implementation. Each call is a single
//! prompt in, a single completion out.

mod error;
mod gemini;

pub use error::LlmError;
pub use gemini::GeminiClient;

use async_trait::async_trait;
use serde::Serialize;

/// Optional sampling parameters forwarded as `generationConfig`.
///
/// All unset by default, which leaves the model's own defaults in place.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl GenerationOptions {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Trait for LLM clients.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Submit a prompt and return the raw completion text.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
