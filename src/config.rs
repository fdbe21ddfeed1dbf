//! Configuration management for the email assistant.
//!
//! Configuration is read once at startup from environment variables (a `.env`
//! file in the working directory is loaded first, if present):
//! - `AUTH_TOKEN` - Required. Bearer token MCP clients must present.
//! - `MY_NUMBER` - Required. Phone-number identity returned by the `validate` tool.
//! - `GOOGLE_API_KEY` - Required. Google AI (Gemini) API key.
//! - `GEMINI_MODEL` - Optional. Model id. Defaults to `gemini-1.5-flash`.
//! - `GEMINI_BASE_URL` - Optional. API root. Defaults to `https://generativelanguage.googleapis.com`.
//! - `HOST` - Optional. Server host. Defaults to `0.0.0.0`.
//! - `PORT` - Optional. Server port. Defaults to `8088`.
//! - `REQUEST_TIMEOUT_SECS` - Optional. Upstream request timeout. Defaults to `120`.
//! - `GEMINI_TEMPERATURE`, `GEMINI_TOP_P`, `GEMINI_MAX_OUTPUT_TOKENS` - Optional.
//!   Sampling parameters sent as `generationConfig`. Unset means the model default.
//!
//! Values are trimmed. `MY_NUMBER` must be set but may be empty.

use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::llm::GenerationOptions;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Upstream model configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Google AI API key
    pub api_key: String,

    /// Model identifier, e.g. `gemini-1.5-flash`
    pub model: String,

    /// API root, without a trailing slash
    pub base_url: String,

    /// Overall timeout for one `generateContent` call
    pub request_timeout: Duration,

    /// Sampling parameters forwarded with every request
    pub options: GenerationOptions,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token required on every MCP request
    pub auth_token: String,

    /// Identity string returned by `validate`
    pub my_number: String,

    /// Upstream model settings
    pub gemini: GeminiConfig,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `AUTH_TOKEN` or `GOOGLE_API_KEY`
    /// is unset or empty, or if `MY_NUMBER` is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };
        let required = |key: &str| -> Result<String, ConfigError> {
            let value = present(key)?;
            if value.is_empty() {
                return Err(ConfigError::MissingEnvVar(key.to_string()));
            }
            Ok(value)
        };
        let optional = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let auth_token = required("AUTH_TOKEN")?;
        let my_number = present("MY_NUMBER")?;
        let api_key = required("GOOGLE_API_KEY")?;

        let model = optional("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base_url = optional("GEMINI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let host = optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = parse_optional(lookup("PORT"), "PORT")?.unwrap_or(8088);

        let timeout_secs: u64 =
            parse_optional(lookup("REQUEST_TIMEOUT_SECS"), "REQUEST_TIMEOUT_SECS")?
                .unwrap_or(120);

        let options = GenerationOptions {
            temperature: parse_optional(optional("GEMINI_TEMPERATURE"), "GEMINI_TEMPERATURE")?,
            top_p: parse_optional(optional("GEMINI_TOP_P"), "GEMINI_TOP_P")?,
            max_output_tokens: parse_optional(
                optional("GEMINI_MAX_OUTPUT_TOKENS"),
                "GEMINI_MAX_OUTPUT_TOKENS",
            )?,
        };

        Ok(Self {
            auth_token,
            my_number,
            gemini: GeminiConfig {
                api_key,
                model,
                base_url,
                request_timeout: Duration::from_secs(timeout_secs),
                options,
            },
            host,
            port,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(auth_token: String, my_number: String, api_key: String) -> Self {
        Self {
            auth_token,
            my_number,
            gemini: GeminiConfig {
                api_key,
                model: DEFAULT_MODEL.to_string(),
                base_url: DEFAULT_BASE_URL.to_string(),
                request_timeout: Duration::from_secs(120),
                options: GenerationOptions::default(),
            },
            host: "127.0.0.1".to_string(),
            port: 8088,
        }
    }
}

fn parse_optional<T>(value: Option<String>, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|e| ConfigError::InvalidValue(key.to_string(), format!("{}", e)))
        })
        .transpose()
}
