//! REST API module for HTTP endpoints
//!
//! - `GET /api/history/pairs` - History as (user, assistant) pairs
//! - `GET /api/history/messages` - History as role-tagged messages
//! - `POST /api/messages` - Append one record
//! - `GET /api/stats` - Log and backup statistics
//! - `POST /api/backup` - Rotate the live log
//! - `GET /api/backups` - List archives
//! - `GET /api/export` - History as a Markdown transcript
//! - `POST /api/chat` - Run one assistant turn

pub mod backup;
pub mod chat;
pub mod export;
pub mod history;
pub mod messages;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::conversation::{LogError, LogResult, Memory};

/// Run log I/O on the blocking pool
///
/// Appends fsync and reads scan the whole file; neither may hold a runtime
/// worker or the memory lock across an await.
pub(crate) async fn with_memory<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Memory) -> LogResult<T> + Send + 'static,
    T: Send + 'static,
{
    let memory = Arc::clone(&state.memory);
    tokio::task::spawn_blocking(move || f(&memory.lock()))
        .await
        .map_err(|e| ApiError::internal(format!("Log task failed: {e}")))?
        .map_err(ApiError::from)
}

/// History limit parameter
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    /// Most recent records to consider; 0 or absent means all
    pub limit: Option<usize>,
}

impl LimitParams {
    /// Resolve against the server default; 0 means unlimited
    pub fn resolve(&self, default: Option<usize>) -> Option<usize> {
        match self.limit {
            Some(0) => None,
            Some(n) => Some(n),
            None => default,
        }
    }
}

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Total count (for list responses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data, total: None }
    }

    pub fn with_total(data: T, total: usize) -> Self {
        Self {
            data,
            total: Some(total),
        }
    }
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(skip)]
    status: StatusCode,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.to_string(),
            status,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<LogError> for ApiError {
    fn from(e: LogError) -> Self {
        tracing::error!(error = %e, "Conversation log access failed");
        Self::internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_resolution() {
        let params = |limit| LimitParams { limit };
        assert_eq!(params(None).resolve(Some(20)), Some(20));
        assert_eq!(params(None).resolve(None), None);
        assert_eq!(params(Some(5)).resolve(Some(20)), Some(5));
        assert_eq!(params(Some(0)).resolve(Some(20)), None);
    }

    #[test]
    fn test_error_body_shape() {
        let err = ApiError::bad_request("role must not be empty");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["error"], "role must not be empty");
        assert_eq!(json["code"], "BAD_REQUEST");
        assert!(json.get("status").is_none());
    }
}
