//! Markdown transcript export

use chrono::{DateTime, Utc};

use crate::types::{Message, Role};

const EXPORT_PREFIX: &str = "conversation_export_";

/// Default file name for an export made at `at`
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("{EXPORT_PREFIX}{}.md", at.format("%Y%m%d_%H%M%S"))
}

/// Render messages as a Markdown transcript
///
/// Each assistant reply is followed by a rule, except the last message.
pub fn render_markdown(messages: &[Message], exported_at: DateTime<Utc>) -> String {
    let mut out = String::from("# AI Assistant Conversation\n\n");
    out.push_str(&format!(
        "**Exported:** {}\n\n---\n\n",
        exported_at.format("%B %d, %Y at %H:%M:%S UTC")
    ));

    for (i, message) in messages.iter().enumerate() {
        let heading = match message.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
            Role::Other(_) => continue,
        };
        out.push_str(&format!("## {heading}\n\n{}\n\n", message.content));

        if message.role == Role::Assistant && i + 1 < messages.len() {
            out.push_str("---\n\n");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message(role: Role, content: &str) -> Message {
        Message {
            role,
            content: content.to_string(),
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 5).unwrap()
    }

    #[test]
    fn test_render_transcript() {
        let messages = vec![
            message(Role::User, "What is Rust?"),
            message(Role::Assistant, "A systems language."),
            message(Role::User, "Thanks"),
            message(Role::Assistant, "Any time."),
        ];

        let markdown = render_markdown(&messages, fixed_time());
        assert_eq!(
            markdown,
            "# AI Assistant Conversation\n\n\
             **Exported:** October 16, 2026 at 09:30:05 UTC\n\n\
             ---\n\n\
             ## You\n\nWhat is Rust?\n\n\
             ## Assistant\n\nA systems language.\n\n\
             ---\n\n\
             ## You\n\nThanks\n\n\
             ## Assistant\n\nAny time.\n\n"
        );
    }

    #[test]
    fn test_render_multiline_content() {
        let messages = vec![message(Role::User, "line one\nline two")];
        let markdown = render_markdown(&messages, fixed_time());
        assert!(markdown.ends_with("## You\n\nline one\nline two\n\n"));
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name(fixed_time()),
            "conversation_export_20261016_093005.md"
        );
    }
}
