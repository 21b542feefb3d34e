//! History endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use super::{with_memory, ApiError, ApiResponse, LimitParams};
use crate::api::state::AppState;
use crate::types::{ExchangePair, Message};

/// GET /api/history/pairs - Conversation history as exchange pairs
pub async fn get_pairs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Result<Json<ApiResponse<Vec<ExchangePair>>>, ApiError> {
    let limit = params.resolve(state.default_limit);
    let pairs = with_memory(&state, move |memory| memory.load_pairs(limit)).await?;
    let total = pairs.len();
    Ok(Json(ApiResponse::with_total(pairs, total)))
}

/// GET /api/history/messages - Conversation history as messages
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Result<Json<ApiResponse<Vec<Message>>>, ApiError> {
    let limit = params.resolve(state.default_limit);
    let messages = with_memory(&state, move |memory| memory.load_messages(limit)).await?;
    let total = messages.len();
    Ok(Json(ApiResponse::with_total(messages, total)))
}
