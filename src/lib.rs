//! Chat Memory
//!
//! A local chat assistant whose conversation memory is a plain,
//! append-only text log.
//!
//! # Features
//!
//! - **Durable log**: one tab-separated record per line, escaped so every
//!   record round-trips exactly
//! - **History replay**: records fold into (user, assistant) pairs or
//!   role-tagged messages
//! - **Rotation**: copy-then-truncate backups into `backups/`
//! - **Retrieval**: optional context from local `.txt`/`.md` documents
//! - **Front ends**: an interactive CLI and a local HTTP API
//!
//! # Modules
//!
//! - `types`: Core data structures (ExchangeRecord, ExchangePair, Message)
//! - `conversation`: Line codec, log store, history, rotation and stats
//! - `assistant`: Model and retriever traits, style detection, turn loop
//! - `search`: Inverted index over knowledge-base documents
//! - `api`: Axum router and REST handlers
//! - `config`: `config.json` loading with defaults
//! - `logging`: Tracing subscriber setup
//! - `utils`: Utility functions (timestamps, atomic writes)
//!
//! # Example
//!
//! ```no_run
//! use chat_memory::{LogConfig, Memory, Role};
//!
//! fn main() -> Result<(), chat_memory::LogError> {
//!     let memory = Memory::open(LogConfig::new("memory"), true)?;
//!     memory.append_message(Role::User, "Hello", Some("user"), None)?;
//!     memory.append_message(Role::Assistant, "Hi!", Some("assistant"), None)?;
//!
//!     for pair in memory.load_pairs(Some(20))? {
//!         println!("{} -> {}", pair.user, pair.assistant);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod assistant;
pub mod config;
pub mod conversation;
pub mod logging;
pub mod search;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use assistant::{Assistant, AssistantError, Model, ModelError, NoRetriever, Retriever};
pub use config::AppConfig;
pub use conversation::{
    BackupManager, ConversationLog, LogConfig, LogError, LogResult, LogStats, Memory, MemoryStats,
};
pub use search::DocumentIndex;
pub use types::{ExchangePair, ExchangeRecord, Message, Role};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
