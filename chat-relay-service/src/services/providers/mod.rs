//! Upstream chat completion providers.
//!
//! The relay talks to a [`ChatProvider`] so tests can substitute the network
//! call with [`mock::MockChatProvider`].

pub mod groq;
pub mod mock;

use crate::models::Message;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Fixed generation parameters; clients cannot tune these.
pub const MAX_TOKENS: u32 = 2000;
pub const TEMPERATURE: f32 = 0.7;
pub const TOP_P: f32 = 0.9;

/// Error type for provider operations. The display text is surfaced to the
/// client verbatim after an `Error: ` prefix.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("rate limited")]
    RateLimited,

    #[error("{status} {body}")]
    Api { status: u16, body: String },

    #[error("{0}")]
    Network(String),

    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Other(String),
}

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
        }
    }
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Run one completion and return the first choice's text, or `None` when
    /// the upstream produced no content.
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, ProviderError>;
}
