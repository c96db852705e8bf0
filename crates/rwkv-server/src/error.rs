//! HTTP error handling and response mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rwkv_chat::ChatError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("chat error: {0}")]
    Chat(#[from] ChatError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("server at capacity")]
    ServiceUnavailable,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ServerError::Chat(ChatError::EmptyInput) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "user_input must not be empty".to_string(),
            ),
            // Bad sampling parameters (e.g. non-positive temperature) are the
            // caller's doing.
            ServerError::Chat(ChatError::Sampling(e)) => {
                (StatusCode::BAD_REQUEST, "invalid_request_error", e.to_string())
            }
            ServerError::Chat(e) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", e.to_string()),
            ServerError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request_error", msg)
            }
            ServerError::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "server_error",
                "Server at capacity, try again later".to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "message": message,
                "type": error_type,
            }
        }));

        (status, body).into_response()
    }
}
