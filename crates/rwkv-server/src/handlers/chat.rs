//! Chat completion handler.

use axum::{extract::State, Json};
use uuid::Uuid;

use crate::{
    error::ServerError,
    models::{ChatCompletionRequest, ChatCompletionResponse},
    state::AppState,
};
use rwkv_chat::chat_turn;
use rwkv_sampling::Sampler;

/// Handle one chat turn.
///
/// Validates input, claims a session slot (503 at capacity), applies request
/// overrides on top of the server defaults, and runs the generation loop
/// synchronously against the shared backend. Nothing persists across
/// requests; every turn starts a fresh session.
pub async fn handle_chat_completion(
    State(state): State<AppState>,
    Json(req): Json<ChatCompletionRequest>,
) -> Result<Json<ChatCompletionResponse>, ServerError> {
    if req.user_input.is_empty() {
        return Err(ServerError::InvalidRequest(
            "user_input must not be empty".to_string(),
        ));
    }

    let guard = state
        .sessions
        .try_acquire(Uuid::new_v4())
        .ok_or(ServerError::ServiceUnavailable)?;
    let session_id = guard.session_id();

    let mut config = state.config.chat.clone();
    if let Some(max_length) = req.max_length {
        config.max_generation_length = max_length;
    }
    if let Some(temperature) = req.temperature {
        config.temperature = temperature;
    }
    if let Some(top_p) = req.top_p {
        config.top_p = top_p;
    }

    if req.debug {
        tracing::info!(
            %session_id,
            max = config.max_generation_length,
            temperature = config.temperature,
            top_p = config.top_p,
            user_input = %req.user_input,
            "chat turn start"
        );
    }

    let mut sampler = Sampler::new()
        .with_temperature(config.temperature)
        .with_top_p(config.top_p)
        .with_seed(session_id.as_u128() as u64);

    let result = chat_turn(
        state.engine.as_ref(),
        state.tokenizer.as_ref(),
        &config,
        &mut sampler,
        &req.user_input,
    )?;

    if req.debug {
        tracing::info!(%session_id, chars = result.len(), "chat turn complete");
    }

    // Guard dropped here — slot freed.
    drop(guard);

    Ok(Json(ChatCompletionResponse { result }))
}
