//! History reconstruction
//!
//! Replays the raw record stream into (user, assistant) pairs or into a
//! flat list of role-tagged messages.
//!
//! Pairing is one left-to-right pass holding at most one pending user turn:
//!
//! - a user turn while another is pending flushes the pending one as
//!   `(pending, "")`
//! - an assistant turn completes the pending user turn, or is emitted as
//!   `("", assistant)` when there is none
//! - a user turn still pending at the end is flushed as `(pending, "")`
//!
//! Every user or assistant record lands in exactly one pair. Records with
//! any other role are ignored.
//!
//! `limit` cuts the *input* to the most recent N records before pairing, so
//! a pair that straddles the window boundary comes back as a lone assistant
//! half.

use crate::types::{ExchangePair, ExchangeRecord, Message, Role};

/// Trailing window of at most `limit` items (`None` or 0 = everything)
fn window<T>(items: &[T], limit: Option<usize>) -> &[T] {
    match limit {
        Some(n) if n > 0 && n < items.len() => &items[items.len() - n..],
        _ => items,
    }
}

/// Reconstruct exchange pairs from records in file order
pub fn to_pairs(records: &[ExchangeRecord], limit: Option<usize>) -> Vec<ExchangePair> {
    let mut pairs = Vec::new();
    let mut pending_user: Option<&str> = None;

    for record in window(records, limit) {
        match record.role {
            Role::User => {
                if let Some(user) = pending_user.replace(&record.text) {
                    pairs.push(ExchangePair::new(user, ""));
                }
            }
            Role::Assistant => {
                let user = pending_user.take().unwrap_or("");
                pairs.push(ExchangePair::new(user, record.text.as_str()));
            }
            Role::Other(_) => {}
        }
    }

    if let Some(user) = pending_user {
        pairs.push(ExchangePair::new(user, ""));
    }

    pairs
}

/// Project records to user/assistant messages, preserving order
///
/// Other roles are filtered out before the trailing window is applied.
pub fn to_messages(records: &[ExchangeRecord], limit: Option<usize>) -> Vec<Message> {
    let messages: Vec<Message> = records
        .iter()
        .filter(|r| r.role.is_dialogue())
        .map(|r| Message {
            role: r.role.clone(),
            content: r.text.clone(),
        })
        .collect();

    match limit {
        Some(n) if n > 0 && n < messages.len() => messages[messages.len() - n..].to_vec(),
        _ => messages,
    }
}
