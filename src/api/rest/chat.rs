//! Chat endpoint

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResponse};
use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub model: String,
}

/// POST /api/chat - Run one assistant turn
///
/// The model call blocks, so the turn runs on the blocking pool.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatResponse>>, ApiError> {
    let assistant = state
        .assistant
        .clone()
        .ok_or_else(|| ApiError::unavailable("No model is configured"))?;

    let message = body.message.trim().to_string();
    if message.is_empty() {
        return Err(ApiError::bad_request("message must not be empty"));
    }

    let model = assistant.model_name().to_string();
    let reply = tokio::task::spawn_blocking(move || assistant.think(&message))
        .await
        .map_err(|e| ApiError::internal(format!("Chat task failed: {e}")))?
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(ApiResponse::new(ChatResponse { reply, model })))
}
