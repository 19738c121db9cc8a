//! Inbound content shapes as sent by the browser client.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Speaker of a message, shared by inbound history and outbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One unit of a multimodal turn.
///
/// Anything that is not a well-formed `text` or `image_url` block, including
/// objects without a `type`, deserializes to [`ContentBlock::Unsupported`] and
/// is dropped during assembly.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text { text: String },
    Image { image_url: ImageSource },
    Unsupported,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum WireBlock {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(rename = "image_url")]
    Image { image_url: ImageSource },
}

impl From<WireBlock> for ContentBlock {
    fn from(block: WireBlock) -> Self {
        match block {
            WireBlock::Text { text } => ContentBlock::Text { text },
            WireBlock::Image { image_url } => ContentBlock::Image { image_url },
        }
    }
}

impl<'de> Deserialize<'de> for ContentBlock {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value::<WireBlock>(value)
            .map(ContentBlock::from)
            .unwrap_or(ContentBlock::Unsupported))
    }
}

/// Image reference: either a bare URL (usually a data URL) or the upstream
/// `{ "url": ... }` object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ImageSource {
    Url(String),
    Object { url: String },
}

impl ImageSource {
    pub fn url(&self) -> &str {
        match self {
            ImageSource::Url(url) | ImageSource::Object { url } => url,
        }
    }
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn image(url: impl Into<String>) -> Self {
        ContentBlock::Image {
            image_url: ImageSource::Url(url.into()),
        }
    }
}

/// A prior turn supplied by the client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: HistoryContent,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HistoryContent {
    Blocks(Vec<ContentBlock>),
    Text(String),
}

/// Reads `history` without ever failing the request: a missing, null or
/// non-array value is empty, and entries that are not `{role, content}` with a
/// known role are skipped.
pub(crate) fn lenient_history<'de, D>(deserializer: D) -> Result<Vec<HistoryEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries,
        _ => return Ok(Vec::new()),
    };

    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<HistoryEntry>(entry) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed history entry");
                None
            }
        })
        .collect())
}
