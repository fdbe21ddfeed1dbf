//! The email operations: build a prompt, call the model, hand back its text.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::llm::{LlmClient, LlmError};
use crate::prompts::{BulletPoints, EmailTask};

/// The only failure an operation reports: the upstream call did not succeed.
#[derive(Debug, Error)]
#[error("Failed to process with Google AI: {0}")]
pub struct UpstreamError(#[from] pub LlmError);

/// Stateless front for the prompt-templated operations.
pub struct EmailAssistant {
    llm: Arc<dyn LlmClient>,
    my_number: String,
}

impl EmailAssistant {
    pub fn new(llm: Arc<dyn LlmClient>, my_number: impl Into<String>) -> Self {
        Self {
            llm,
            my_number: my_number.into(),
        }
    }

    /// Identity check used by the MCP host: the configured number without leading `+`.
    pub fn validate(&self) -> String {
        self.my_number.trim_start_matches('+').to_string()
    }

    pub async fn analyze_email_tone(&self, email_draft: &str) -> Result<String, UpstreamError> {
        self.complete(EmailTask::AnalyzeTone { draft: email_draft })
            .await
    }

    pub async fn rewrite_email(
        &self,
        email_draft: &str,
        target_tone: &str,
    ) -> Result<String, UpstreamError> {
        self.complete(EmailTask::Rewrite {
            draft: email_draft,
            target_tone,
        })
        .await
    }

    pub async fn shorten_email(&self, email_draft: &str) -> Result<String, UpstreamError> {
        self.complete(EmailTask::Shorten { draft: email_draft })
            .await
    }

    pub async fn expand_from_bullets(
        &self,
        bullet_points: &BulletPoints,
        goal: Option<&str>,
    ) -> Result<String, UpstreamError> {
        self.complete(EmailTask::ExpandFromBullets {
            bullets: bullet_points,
            goal,
        })
        .await
    }

    async fn complete(&self, task: EmailTask<'_>) -> Result<String, UpstreamError> {
        let start = Instant::now();
        match self.llm.generate(&task.prompt()).await {
            Ok(text) => {
                tracing::info!(
                    "{} completed in {:?} ({} bytes)",
                    task.label(),
                    start.elapsed(),
                    text.len()
                );
                Ok(text)
            }
            Err(e) => {
                tracing::error!(
                    "{} failed after {:?} (upstream status: {}): {}",
                    task.label(),
                    start.elapsed(),
                    e.status_code()
                        .map_or_else(|| "none".to_string(), |code| code.to_string()),
                    e
                );
                Err(UpstreamError(e))
            }
        }
    }
}
