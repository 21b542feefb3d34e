//! Time and timestamp utilities

use chrono::{DateTime, SecondsFormat, Utc};

/// Current time as an ISO-8601 UTC string with microseconds
pub fn now_iso8601() -> String {
    to_iso8601(Utc::now())
}

/// Format a UTC time the way records are stamped
pub fn to_iso8601(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Second-granularity stamp used in backup archive names
pub fn archive_stamp(time: DateTime<Utc>) -> String {
    time.format("%Y%m%d_%H%M%S").to_string()
}
