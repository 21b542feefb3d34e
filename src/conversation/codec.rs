//! Line codec for the conversation log
//!
//! One record is one physical line: `timestamp TAB role TAB userId TAB text`.
//! Backslash, tab, CR and LF inside a field are written as two-character
//! escapes (`\\`, `\t`, `\r`, `\n`), so an encoded record never contains a
//! raw separator or line break and every string survives a round trip.
//!
//! Escaping the backslash itself is what keeps literal `\n` text distinct
//! from an escaped newline. Logs written before backslashes were escaped
//! still decode: their `\t`/`\n`/`\r` pairs come back as control characters,
//! and any other backslash is kept as-is.

use crate::types::{ExchangeRecord, Role};

/// Field separator
pub const SEPARATOR: char = '\t';

const ESCAPE: char = '\\';

/// Encode a record as one log line, including the trailing newline
pub fn encode(record: &ExchangeRecord) -> String {
    let mut line = String::with_capacity(
        record.timestamp.len() + record.user_id.len() + record.text.len() + 16,
    );
    escape_into(&record.timestamp, &mut line);
    line.push(SEPARATOR);
    escape_into(record.role.as_str(), &mut line);
    line.push(SEPARATOR);
    escape_into(&record.user_id, &mut line);
    line.push(SEPARATOR);
    escape_into(&record.text, &mut line);
    line.push('\n');
    line
}

/// Decode one log line
///
/// Returns `None` for blank lines and lines with fewer than four fields.
/// A malformed line is never an error.
pub fn decode(line: &str) -> Option<ExchangeRecord> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.is_empty() {
        return None;
    }

    let mut fields = line.splitn(4, SEPARATOR);
    let timestamp = fields.next()?;
    let role = fields.next()?;
    let user_id = fields.next()?;
    let text = fields.next()?;

    Some(ExchangeRecord {
        timestamp: unescape(timestamp),
        role: Role::from(unescape(role)),
        user_id: unescape(user_id),
        text: unescape(text),
    })
}

fn escape_into(field: &str, out: &mut String) {
    for c in field.chars() {
        match c {
            ESCAPE => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
}

/// Reverse the field escaping in a single left-to-right pass
pub fn unescape(field: &str) -> String {
    if !field.contains(ESCAPE) {
        return field.to_string();
    }

    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != ESCAPE {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            // Unknown pair: keep it literally
            Some(other) => {
                out.push(ESCAPE);
                out.push(other);
            }
            None => out.push(ESCAPE),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_text(text: &str) -> ExchangeRecord {
        ExchangeRecord::with_timestamp("2026-10-16T09:30:00.000000Z", Role::User, "u1", text)
    }

    fn assert_round_trip(text: &str) {
        let record = record_with_text(text);
        let line = encode(&record);
        assert_eq!(line.matches('\n').count(), 1, "line: {:?}", line);
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches(SEPARATOR).count(), 3, "line: {:?}", line);

        let decoded = decode(&line).expect("encoded line must decode");
        assert_eq!(decoded.text, text);
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_round_trip_awkward_text() {
        for text in [
            "",
            " ",
            "   \t  ",
            "hello world",
            "line one\nline two",
            "windows\r\nline",
            "tab\tseparated\tvalues",
            "literal \\t and \\n markers",
            "\\",
            "ends with backslash\\",
            "\\\\n",
            "\\\t\\\n",
            "unicode: héllo 世界 🦀",
            "\n\n\n",
        ] {
            assert_round_trip(text);
        }
    }

    #[test]
    fn test_encode_layout() {
        let record = ExchangeRecord::with_timestamp(
            "2026-10-16T09:30:00Z",
            Role::Assistant,
            "assistant",
            "a\tb\nc",
        );
        assert_eq!(
            encode(&record),
            "2026-10-16T09:30:00Z\tassistant\tassistant\ta\\tb\\nc\n"
        );
    }

    #[test]
    fn test_user_id_is_escaped() {
        let record = ExchangeRecord::with_timestamp("ts", Role::User, "bad\tid\n", "hi");
        let line = encode(&record);
        assert_eq!(line.matches(SEPARATOR).count(), 3);
        assert_eq!(decode(&line).unwrap().user_id, "bad\tid\n");
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(decode("").is_none());
        assert!(decode("   ").is_none());
        assert!(decode("\n").is_none());
        assert!(decode("2026-10-16T09:30:00Z\tuser\tonly three").is_none());
        assert!(decode("garbage without separators").is_none());
    }

    #[test]
    fn test_round_trip_blank_fields() {
        let record = ExchangeRecord::with_timestamp("", Role::from(""), "", " ");
        let line = encode(&record);
        assert_eq!(line, "\t\t\t \n");
        assert_eq!(decode(&line).unwrap(), record);

        let empty = ExchangeRecord::with_timestamp("", Role::from(""), "", "");
        assert_eq!(decode(&encode(&empty)).unwrap(), empty);
    }

    #[test]
    fn test_decode_keeps_extra_tabs_in_text() {
        let record = decode("ts\tuser\tu\ttext\twith raw tab\n").unwrap();
        assert_eq!(record.text, "text\twith raw tab");
    }

    #[test]
    fn test_decode_crlf_terminated_line() {
        let record = decode("ts\tuser\tu\thello\r\n").unwrap();
        assert_eq!(record.text, "hello");
    }

    #[test]
    fn test_decode_legacy_escapes() {
        // Written by an encoder that escaped tabs and newlines but not backslashes
        let record = decode("ts\tuser\tu\tC:\\Users\\me\\nnext line").unwrap();
        assert_eq!(record.text, "C:\\Users\\me\nnext line");
    }

    #[test]
    fn test_other_roles_preserved() {
        let record = ExchangeRecord::with_timestamp("ts", Role::from("system"), "", "boot");
        let decoded = decode(&encode(&record)).unwrap();
        assert_eq!(decoded.role, Role::Other("system".to_string()));
        assert_eq!(decoded.user_id, "");
    }
}
