//! Exchange record types
//!
//! One record is one persisted turn of dialogue. Records are created when a
//! turn happens, appended once, and never updated afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::time::now_iso8601;

/// Speaker of a turn
///
/// Only `User` and `Assistant` take part in pairing; any other role read
/// from the log is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Assistant,
    Other(String),
}

impl Role {
    /// Wire form of the role as stored in the log
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Other(s) => s,
        }
    }

    /// True for the two roles that take part in conversation history
    pub fn is_dialogue(&self) -> bool {
        matches!(self, Role::User | Role::Assistant)
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            other => Role::Other(other.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => Role::Other(s),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single turn persisted to the conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRecord {
    /// ISO-8601 UTC timestamp
    pub timestamp: String,
    pub role: Role,
    /// Opaque user identifier, may be empty
    #[serde(default)]
    pub user_id: String,
    pub text: String,
}

impl ExchangeRecord {
    /// Create a record stamped with the current time
    pub fn new(role: Role, user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_timestamp(now_iso8601(), role, user_id, text)
    }

    /// Create a record with a caller-supplied timestamp
    pub fn with_timestamp(
        timestamp: impl Into<String>,
        role: Role,
        user_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            role,
            user_id: user_id.into(),
            text: text.into(),
        }
    }

    /// Shorthand for a user turn
    pub fn user(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(Role::User, user_id, text)
    }

    /// Shorthand for an assistant turn
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, "assistant", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::from("user"), Role::User);
        assert_eq!(Role::from("assistant"), Role::Assistant);
        assert_eq!(Role::from("system"), Role::Other("system".to_string()));
        assert_eq!(Role::from("User"), Role::Other("User".to_string()));
    }

    #[test]
    fn test_role_serde_as_plain_string() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");

        let role: Role = serde_json::from_str("\"tool\"").unwrap();
        assert_eq!(role, Role::Other("tool".to_string()));
        assert!(!role.is_dialogue());
    }

    #[test]
    fn test_new_record_has_utc_timestamp() {
        let record = ExchangeRecord::user("alice", "hello");
        assert!(record.timestamp.ends_with('Z'));
        assert_eq!(record.role, Role::User);
        assert_eq!(record.user_id, "alice");
    }
}
