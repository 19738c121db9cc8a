use crate::error::RelayError;
use crate::models::{ChatRequest, ChatResponse};
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

/// `POST /api/chat`
///
/// Any body that does not carry a `contentArray` array is rejected before the
/// upstream is contacted.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, RelayError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected chat payload");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            RelayError::PayloadTooLarge
        } else {
            RelayError::InvalidContent
        }
    })?;

    let response = state.relay.relay(&request).await?;
    Ok(Json(response))
}
