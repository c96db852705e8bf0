//! Chat completion request/response types.

use serde::{Deserialize, Serialize};

/// Chat completion request.
///
/// Only `user_input` is required; the rest fall back to server defaults.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionRequest {
    pub user_input: String,
    pub max_length: Option<usize>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    /// Verbose server-side logging for this request. Never affects output.
    #[serde(default)]
    pub debug: bool,
}

/// Chat completion response.
#[derive(Debug, Serialize)]
pub struct ChatCompletionResponse {
    pub result: String,
}
