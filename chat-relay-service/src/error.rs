use crate::services::providers::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::any::Any;
use thiserror::Error;

/// Failures at the `/api/chat` boundary.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid content format")]
    InvalidContent,

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, error, success) = match &self {
            RelayError::InvalidContent => (StatusCode::BAD_REQUEST, self.to_string(), None),
            RelayError::PayloadTooLarge => {
                (StatusCode::PAYLOAD_TOO_LARGE, self.to_string(), None)
            }
            RelayError::Provider(_) | RelayError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error: {}", self),
                Some(false),
            ),
        };

        (status, Json(ErrorResponse { error, success })).into_response()
    }
}

/// Converts a handler panic into the same 500 body as any other failure.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unexpected failure".to_string()
    };

    tracing::error!(error = %message, "Handler panicked");
    RelayError::Internal(message).into_response()
}
