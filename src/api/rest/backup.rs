//! Statistics and backup endpoints

use std::path::PathBuf;
use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use super::{with_memory, ApiError, ApiResponse};
use crate::api::state::AppState;
use crate::conversation::{ArchiveInfo, MemoryStats};

/// Response for POST /api/backup
#[derive(Debug, Serialize)]
pub struct BackupResponse {
    /// Archive written, absent when the log was empty
    pub archive: Option<PathBuf>,
}

/// GET /api/stats - Log and backup statistics
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<MemoryStats>>, ApiError> {
    let stats = with_memory(&state, |memory| memory.detailed_stats()).await?;
    Ok(Json(ApiResponse::new(stats)))
}

/// POST /api/backup - Archive and clear the live log
pub async fn create_backup(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<BackupResponse>>, ApiError> {
    let archive = with_memory(&state, |memory| memory.backup()).await?;
    Ok(Json(ApiResponse::new(BackupResponse { archive })))
}

/// GET /api/backups - List archives, oldest first
pub async fn list_backups(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ArchiveInfo>>>, ApiError> {
    let archives = with_memory(&state, |memory| memory.list_backups()).await?;
    let total = archives.len();
    Ok(Json(ApiResponse::with_total(archives, total)))
}
