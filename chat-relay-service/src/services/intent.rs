//! Keyword-based intent detection and the system prompt for each intent.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Default,
    Caption,
    Thread,
    Professional,
    Analysis,
}

/// Ordered rule table. Earlier rules take precedence, so a message that
/// mentions both Instagram and Twitter is a caption request.
const RULES: &[(Intent, &[&str])] = &[
    (Intent::Caption, &["instagram", "caption"]),
    (Intent::Thread, &["twitter", "thread"]),
    (Intent::Professional, &["linkedin", "professional"]),
    (Intent::Analysis, &["analyze", "analysis"]),
];

/// Classify a user message by case-insensitive keyword match. Total: anything
/// that matches no rule is [`Intent::Default`].
pub fn classify(message: &str) -> Intent {
    let message = message.to_lowercase();

    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| message.contains(k)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::Default)
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Default => "default",
            Intent::Caption => "caption",
            Intent::Thread => "thread",
            Intent::Professional => "professional",
            Intent::Analysis => "analysis",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            Intent::Default => {
                "You are a helpful social media AI agent. Respond in formatted paragraphs, bullets, steps, include emojis. Analyze images if provided."
            }
            Intent::Caption => {
                "You are a creative Instagram caption writer. Create engaging, emoji-rich captions with relevant hashtags."
            }
            Intent::Thread => {
                "You are a Twitter thread expert. Create viral, engaging threads with hooks and clear structure."
            }
            Intent::Professional => {
                "You are a LinkedIn content strategist. Create professional, value-driven content."
            }
            Intent::Analysis => {
                "You are a social media analyst. Analyze images and provide strategic posting recommendations."
            }
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
