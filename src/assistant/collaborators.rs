//! Interfaces to the assistant's external collaborators
//!
//! The model and the retriever are consumed through these two narrow traits.
//! Both are synchronous; timeouts and retries belong to the implementation.

use thiserror::Error;

/// Errors from a language model backend
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model unavailable: {0}")]
    Unavailable(String),

    #[error("Unexpected model response: {0}")]
    InvalidResponse(String),
}

/// A text-completion backend
pub trait Model: Send + Sync {
    /// Complete `prompt`
    fn generate(&self, prompt: &str) -> Result<String, ModelError>;

    /// Model name for display
    fn name(&self) -> &str;
}

/// Best-effort context lookup
///
/// An empty string means "nothing relevant"; implementations never fail.
pub trait Retriever: Send + Sync {
    fn query(&self, text: &str) -> String;
}

/// Retriever used when no knowledge base is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRetriever;

impl Retriever for NoRetriever {
    fn query(&self, _text: &str) -> String {
        String::new()
    }
}
