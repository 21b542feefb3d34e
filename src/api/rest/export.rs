//! Transcript export endpoint

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};

use super::{with_memory, ApiError, LimitParams};
use crate::api::state::AppState;

/// GET /api/export - Conversation history as Markdown
pub async fn export_markdown(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = params.resolve(state.default_limit);
    let markdown = with_memory(&state, move |memory| memory.export_markdown(limit)).await?;
    Ok(([(header::CONTENT_TYPE, "text/markdown; charset=utf-8")], markdown))
}
