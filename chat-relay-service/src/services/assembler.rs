//! Builds the upstream message list from the client payload.

use crate::models::{
    ContentBlock, ContentPart, HistoryContent, HistoryEntry, Message, MessageContent,
};

/// Most recent history entries forwarded upstream.
pub const MAX_HISTORY_MESSAGES: usize = 10;

/// Text sent alongside an image that arrives without any accompanying text.
pub const BARE_IMAGE_INSTRUCTION: &str =
    "Analyze this image in detail and provide social media recommendations.";

#[derive(Debug, Clone, PartialEq)]
pub struct AssembledMessages {
    pub messages: Vec<Message>,
    pub has_image: bool,
}

/// Assemble `system prompt, trimmed history, current turn` in that order.
pub fn assemble(
    system_prompt: &str,
    history: &[HistoryEntry],
    content: &[ContentBlock],
) -> AssembledMessages {
    let start = history.len().saturating_sub(MAX_HISTORY_MESSAGES);

    let mut messages = Vec::with_capacity(history.len() - start + 2);
    messages.push(Message::system(system_prompt));
    messages.extend(history[start..].iter().map(history_message));

    let (parts, has_image) = current_turn(content);
    messages.push(Message::user(parts));

    AssembledMessages {
        messages,
        has_image,
    }
}

fn history_message(entry: &HistoryEntry) -> Message {
    let content = match &entry.content {
        HistoryContent::Text(text) => MessageContent::Text(text.clone()),
        HistoryContent::Blocks(blocks) => {
            MessageContent::Parts(blocks.iter().filter_map(to_part).collect())
        }
    };

    Message {
        role: entry.role,
        content,
    }
}

fn to_part(block: &ContentBlock) -> Option<ContentPart> {
    match block {
        ContentBlock::Text { text } => Some(ContentPart::text(text.as_str())),
        ContentBlock::Image { image_url } => Some(ContentPart::image(image_url.url())),
        ContentBlock::Unsupported => None,
    }
}

fn current_turn(content: &[ContentBlock]) -> (Vec<ContentPart>, bool) {
    let mut parts: Vec<ContentPart> = content
        .iter()
        .filter(|block| match block {
            ContentBlock::Text { text } => !text.trim().is_empty(),
            ContentBlock::Image { .. } => true,
            ContentBlock::Unsupported => false,
        })
        .filter_map(to_part)
        .collect();

    let has_image = parts.iter().any(ContentPart::is_image);

    if has_image && parts.len() == 1 {
        parts.insert(0, ContentPart::text(BARE_IMAGE_INSTRUCTION));
    }

    (parts, has_image)
}
