//! Request pipeline: classify, assemble, pick a model, call upstream.

use crate::config::ModelConfig;
use crate::error::RelayError;
use crate::models::{ChatRequest, ChatResponse, ContentBlock};
use crate::services::assembler::assemble;
use crate::services::intent::classify;
use crate::services::providers::{ChatProvider, CompletionRequest};
use std::sync::Arc;

/// Returned with `success: true` when the upstream produced no usable text.
pub const EMPTY_GENERATION_FALLBACK: &str = "I couldn't generate a response. Please try again.";

const PREVIEW_CHARS: usize = 50;

#[derive(Clone)]
pub struct ChatRelay {
    provider: Arc<dyn ChatProvider>,
    models: ModelConfig,
}

impl ChatRelay {
    pub fn new(provider: Arc<dyn ChatProvider>, models: ModelConfig) -> Self {
        Self { provider, models }
    }

    pub async fn relay(&self, request: &ChatRequest) -> Result<ChatResponse, RelayError> {
        let intent = classify(first_text(&request.content_array));
        let assembled = assemble(
            intent.system_prompt(),
            &request.history,
            &request.content_array,
        );
        let model = self.models.select(assembled.has_image);

        tracing::info!(
            model = %model,
            intent = %intent,
            message_count = assembled.messages.len(),
            "Relaying chat request"
        );

        let completion = CompletionRequest::new(model, assembled.messages);
        let answer = self.provider.complete(&completion).await.map_err(|e| {
            tracing::error!(error = %e, model = %model, "Upstream completion failed");
            e
        })?;

        match answer.filter(|text| !text.trim().is_empty()) {
            Some(content) => {
                let preview: String = content.chars().take(PREVIEW_CHARS).collect();
                tracing::info!(preview = %preview, "Response generated");

                Ok(ChatResponse {
                    content,
                    success: true,
                    intent: Some(intent),
                })
            }
            None => {
                tracing::warn!(model = %model, "Upstream returned no content");

                Ok(ChatResponse {
                    content: EMPTY_GENERATION_FALLBACK.to_string(),
                    success: true,
                    intent: None,
                })
            }
        }
    }
}

/// Text of the first text block, even if blank; drives intent detection.
fn first_text(content: &[ContentBlock]) -> &str {
    content
        .iter()
        .find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .unwrap_or("")
}
