use super::content::{lenient_history, ContentBlock, HistoryEntry};
use crate::services::intent::Intent;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`.
///
/// Only `contentArray` can fail deserialization, and only when it is missing
/// or not an array; individual blocks and history never reject the request.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(rename = "contentArray")]
    pub content_array: Vec<ContentBlock>,
    #[serde(default, deserialize_with = "lenient_history")]
    pub history: Vec<HistoryEntry>,
}

/// Successful reply. `intent` is absent on the empty-generation fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_array_must_be_an_array() {
        for body in [
            json!({}),
            json!({"contentArray": null}),
            json!({"contentArray": "hi"}),
            json!({"contentArray": {"type": "text", "text": "hi"}}),
        ] {
            assert!(serde_json::from_value::<ChatRequest>(body).is_err());
        }
    }

    #[test]
    fn history_shape_never_rejects() {
        for history in [
            json!(null),
            json!("not a list"),
            json!([{"role": "robot", "content": "x"}, {"content": "no role"}, 7]),
        ] {
            let request: ChatRequest =
                serde_json::from_value(json!({"contentArray": [], "history": history})).unwrap();
            assert!(request.history.is_empty());
        }
    }

    #[test]
    fn valid_history_entries_survive_next_to_bad_ones() {
        let request: ChatRequest = serde_json::from_value(json!({
            "contentArray": [],
            "history": [{"role": "robot", "content": "x"}, {"role": "assistant", "content": "ok"}]
        }))
        .unwrap();
        assert_eq!(request.history.len(), 1);
    }
}
