//! LLM error types.
//!
//! Variants only exist to make logs useful. Callers treat every variant the
//! same way: the upstream call failed.

use thiserror::Error;

/// Error from a `generateContent` call.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Connection failed, timed out, or the body could not be read
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream answered with a non-success status (bad key, quota, etc.)
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Upstream returned no candidates, usually because the prompt was blocked
    #[error("No candidates in response{}", .block_reason.as_deref().map(|r| format!(" (blocked: {})", r)).unwrap_or_default())]
    NoCandidates { block_reason: Option<String> },
}

impl LlmError {
    /// HTTP status code, if the upstream answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            LlmError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Network(format!("Request timeout: {}", e))
        } else if e.is_connect() {
            LlmError::Network(format!("Connection failed: {}", e))
        } else {
            LlmError::Network(format!("Request failed: {}", e))
        }
    }
}
