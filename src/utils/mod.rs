//! Utility functions and helpers
//!
//! Timestamp formatting and crash-safe file writes.

pub mod atomic;
pub mod time;

pub use atomic::{atomic_copy, atomic_write, cleanup_temp_files};
pub use time::{archive_stamp, now_iso8601, to_iso8601};
