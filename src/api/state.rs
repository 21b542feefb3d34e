//! Shared application state for HTTP handlers

use std::sync::Arc;

use parking_lot::Mutex;

use crate::assistant::Assistant;
use crate::conversation::Memory;

/// State handed to every handler
///
/// The memory mutex is the single point that serialises log access; the
/// assistant shares the same mutex.
pub struct AppState {
    /// The conversation memory
    pub memory: Arc<Mutex<Memory>>,

    /// Chat backend, absent when the server runs in history-only mode
    pub assistant: Option<Arc<Assistant>>,

    /// Limit applied when a history request names none
    pub default_limit: Option<usize>,
}

impl AppState {
    /// Create state without a chat backend
    pub fn new(memory: Arc<Mutex<Memory>>) -> Self {
        Self {
            memory,
            assistant: None,
            default_limit: None,
        }
    }

    /// Create state backed by an assistant, sharing its memory
    pub fn with_assistant(assistant: Arc<Assistant>) -> Self {
        Self {
            memory: assistant.memory().clone(),
            assistant: Some(assistant),
            default_limit: None,
        }
    }

    pub fn with_default_limit(mut self, limit: Option<usize>) -> Self {
        self.default_limit = limit;
        self
    }
}
