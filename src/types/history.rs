//! Derived history views
//!
//! These are recomputed from the log on demand and never persisted.

use serde::{Deserialize, Serialize};

use super::record::Role;

/// A reconstructed (user, assistant) exchange
///
/// Either side is empty when no counterpart was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangePair {
    pub user: String,
    pub assistant: String,
}

impl ExchangePair {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }
}

impl<U: Into<String>, A: Into<String>> From<(U, A)> for ExchangePair {
    fn from((user, assistant): (U, A)) -> Self {
        Self::new(user, assistant)
    }
}

/// A role-tagged message for message-oriented front ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}
