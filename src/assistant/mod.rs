//! The assistant turn loop
//!
//! One call to [`Assistant::think`] is one conversational turn: style
//! detection, context lookup, prompt assembly, the model call, and the two
//! appends to the conversation log.

pub mod collaborators;
pub mod ollama;
pub mod style;

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

pub use collaborators::{Model, ModelError, NoRetriever, Retriever};
pub use ollama::OllamaClient;
pub use style::{build_prompt, detect_style, InfoType, Length, ResponseStyle, Tone};

use crate::conversation::{LogError, Memory};
use crate::types::{ExchangeRecord, Role};
use crate::utils::now_iso8601;

/// Errors that end a turn without a reply
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Failed to record turn: {0}")]
    Log(#[from] LogError),
}

/// Chat assistant bound to a memory directory
pub struct Assistant {
    model: Box<dyn Model>,
    retriever: Box<dyn Retriever>,
    memory: Arc<Mutex<Memory>>,
    user_id: String,
}

impl Assistant {
    pub fn new(
        model: Box<dyn Model>,
        retriever: Box<dyn Retriever>,
        memory: Arc<Mutex<Memory>>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            model,
            retriever,
            memory,
            user_id: user_id.into(),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn memory(&self) -> &Arc<Mutex<Memory>> {
        &self.memory
    }

    /// Answer one user message and record the exchange
    ///
    /// Model failures become an apology reply. Only log write failures are
    /// returned as errors.
    pub fn think(&self, user_text: &str) -> Result<String, AssistantError> {
        let style = detect_style(user_text);
        let context = self.retriever.query(user_text);
        let prompt = build_prompt(user_text, &context, &style);

        tracing::debug!(
            length = ?style.length,
            tone = ?style.tone,
            info_type = ?style.info_type,
            context_chars = context.len(),
            "Prompt assembled"
        );

        let reply = match self.model.generate(&prompt) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!(model = %self.model.name(), error = %e, "Model call failed");
                format!(
                    "I encountered an error connecting to the AI model: {e}\n\
                     Please make sure Ollama is running and the model is available."
                )
            }
        };

        let timestamp = now_iso8601();
        let user_record =
            ExchangeRecord::with_timestamp(&timestamp, Role::User, &self.user_id, user_text);
        let assistant_record =
            ExchangeRecord::with_timestamp(&timestamp, Role::Assistant, "assistant", &reply);

        {
            let memory = self.memory.lock();
            memory.append(&user_record)?;
            memory.append(&assistant_record)?;
        }

        Ok(reply)
    }
}
