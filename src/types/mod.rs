//! Data types for the conversation log
//!
//! This module contains the record and history types shared by the store,
//! the assistant, and the front ends.

mod history;
mod record;

pub use history::{ExchangePair, Message};
pub use record::{ExchangeRecord, Role};
