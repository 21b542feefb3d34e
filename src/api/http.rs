//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use super::rest::{backup, chat, export, history, messages};
use super::state::AppState;

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // Local clients only; allow any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/history/pairs", get(history::get_pairs))
        .route("/api/history/messages", get(history::get_messages))
        .route("/api/messages", post(messages::append_message))
        .route("/api/stats", get(backup::get_stats))
        .route("/api/backup", post(backup::create_backup))
        .route("/api/backups", get(backup::list_backups))
        .route("/api/export", get(export::export_markdown))
        .route("/api/chat", post(chat::chat))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
