//! Record append endpoint

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use super::{with_memory, ApiError, ApiResponse};
use crate::api::state::AppState;
use crate::types::{ExchangeRecord, Role};

/// Body for POST /api/messages
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendRequest {
    pub role: String,
    pub text: String,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Defaults to the time of the request
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// POST /api/messages - Append one record to the log
pub async fn append_message(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AppendRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ExchangeRecord>>), ApiError> {
    if body.role.trim().is_empty() {
        return Err(ApiError::bad_request("role must not be empty"));
    }

    let role = Role::from(body.role);
    let user_id = body.user_id.unwrap_or_default();
    let record = match body.timestamp {
        Some(ts) => ExchangeRecord::with_timestamp(ts, role, user_id, body.text),
        None => ExchangeRecord::new(role, user_id, body.text),
    };

    let record = with_memory(&state, move |memory| {
        memory.append(&record)?;
        Ok(record)
    })
    .await?;
    tracing::debug!(role = %record.role, "Record appended over HTTP");

    Ok((StatusCode::CREATED, Json(ApiResponse::new(record))))
}
