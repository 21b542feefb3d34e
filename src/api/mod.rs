//! HTTP API over the conversation memory
//!
//! This module exposes the memory directory and the assistant to local
//! clients: history reads, appends, statistics, backups and chat turns.

pub mod http;
pub mod rest;
pub mod state;

pub use http::create_router;
pub use state::AppState;
