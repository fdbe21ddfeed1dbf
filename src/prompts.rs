//! Instruction templates for the email tools.
//!
//! Each task substitutes the caller's text into a fixed instruction. Inputs
//! are inserted verbatim; empty inputs are not rejected.

use serde::Deserialize;

/// Bullet points as supplied by the caller: either one block of notes or a list.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum BulletPoints {
    Text(String),
    List(Vec<String>),
}

impl BulletPoints {
    /// Render as prompt text. Lists become one `- item` line per entry.
    pub fn render(&self) -> String {
        match self {
            BulletPoints::Text(text) => text.clone(),
            BulletPoints::List(items) => items
                .iter()
                .map(|item| format!("- {}", item))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// One of the four prompt-templated operations.
#[derive(Debug, Clone, Copy)]
pub enum EmailTask<'a> {
    AnalyzeTone {
        draft: &'a str,
    },
    Rewrite {
        draft: &'a str,
        target_tone: &'a str,
    },
    Shorten {
        draft: &'a str,
    },
    ExpandFromBullets {
        bullets: &'a BulletPoints,
        goal: Option<&'a str>,
    },
}

impl EmailTask<'_> {
    /// Short name used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            EmailTask::AnalyzeTone { .. } => "analyze_tone",
            EmailTask::Rewrite { .. } => "rewrite",
            EmailTask::Shorten { .. } => "shorten",
            EmailTask::ExpandFromBullets { .. } => "expand_from_bullets",
        }
    }

    /// Build the instruction string sent to the model.
    pub fn prompt(&self) -> String {
        match *self {
            EmailTask::AnalyzeTone { draft } => format!(
                "Please analyze the tone of the following email draft. Describe the current tone \
                 and provide a bulleted list of suggestions for improvement.\n\nDraft:\n---\n{}",
                draft
            ),
            EmailTask::Rewrite { draft, target_tone } => format!(
                "Please rewrite the following email draft to have a '{}' tone. Provide only the \
                 rewritten version.\n\nDraft:\n---\n{}",
                target_tone, draft
            ),
            EmailTask::Shorten { draft } => format!(
                "Please shorten the following email to be as concise as possible while retaining \
                 the core message. Provide only the shortened version.\n\nDraft:\n---\n{}",
                draft
            ),
            EmailTask::ExpandFromBullets { bullets, goal } => {
                let goal_sentence = goal
                    .map(|g| format!(" The goal of the email is: {}.", g))
                    .unwrap_or_default();
                format!(
                    "Please expand the following bullet points into a well-formatted email.{} \
                     Provide only the full email text.\n\nBullet Points:\n---\n{}",
                    goal_sentence,
                    bullets.render()
                )
            }
        }
    }
}
