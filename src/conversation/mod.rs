//! Conversation memory
//!
//! This module provides the persistent side of the assistant:
//! - `codec`: one record per line, with escaping for control characters
//! - `ConversationLog`: the append-only log file
//! - `history`: replay of records into pairs or messages
//! - `BackupManager`: copy-then-truncate rotation into `backups/`
//! - `StatsCollector`: counts and sizes
//!
//! # Layout
//!
//! ```text
//! memory/
//! ├── conversation_log.txt            live log, append-only
//! └── backups/
//!     ├── conversation_20261016_093000.txt
//!     └── conversation_20261016_093000_1.txt
//! ```
//!
//! # Flow
//!
//! ```text
//! turn ──► Memory::append_message ──► codec::encode ──► conversation_log.txt
//! seed ◄── history::to_pairs ◄── codec::decode ◄── ConversationLog::records
//! /backup ─► BackupManager::rotate ─► atomic copy ─► truncate live log
//! ```
//!
//! None of this is safe to call from several threads on the same directory
//! without external serialisation; front ends wrap [`Memory`] in a mutex.

pub mod codec;
mod export;
pub mod history;
mod rotation;
mod stats;
mod store;

use std::path::{Path, PathBuf};

use chrono::Utc;

pub use export::{export_file_name, render_markdown};
pub use history::{to_messages, to_pairs};
pub use rotation::{ArchiveInfo, BackupManager};
pub use stats::{format_size, MemoryStats, StatsCollector};
pub use store::{
    ConversationLog, LogConfig, LogError, LogResult, LogStats, Records, BACKUP_DIR_NAME,
    LOG_FILE_NAME,
};

use crate::types::{ExchangePair, ExchangeRecord, Message, Role};
use crate::utils::atomic::atomic_write;

/// The operations front ends may call on the conversation log
///
/// When disabled, writes are dropped and reads come back empty.
#[derive(Debug, Clone)]
pub struct Memory {
    log: ConversationLog,
    backups: BackupManager,
    enabled: bool,
}

impl Memory {
    /// Open (or create) the memory directory
    ///
    /// A disabled memory never touches the filesystem.
    pub fn open(config: LogConfig, enabled: bool) -> LogResult<Self> {
        let log = if enabled {
            ConversationLog::open(config.clone())?
        } else {
            ConversationLog::from_config(config.clone())
        };

        Ok(Self {
            log,
            backups: BackupManager::new(config),
            enabled,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn log_path(&self) -> PathBuf {
        self.log.path()
    }

    /// Append one turn; the timestamp defaults to now
    pub fn append_message(
        &self,
        role: Role,
        text: &str,
        user_id: Option<&str>,
        timestamp: Option<&str>,
    ) -> LogResult<()> {
        let record = match timestamp {
            Some(ts) => ExchangeRecord::with_timestamp(ts, role, user_id.unwrap_or(""), text),
            None => ExchangeRecord::new(role, user_id.unwrap_or(""), text),
        };
        self.append(&record)
    }

    /// Append a prepared record
    pub fn append(&self, record: &ExchangeRecord) -> LogResult<()> {
        if !self.enabled {
            return Ok(());
        }
        self.log.append(record)
    }

    /// All decodable records in file order
    pub fn records(&self) -> LogResult<Vec<ExchangeRecord>> {
        if !self.enabled {
            return Ok(Vec::new());
        }
        self.log.read_all()
    }

    /// History as (user, assistant) pairs
    pub fn load_pairs(&self, limit: Option<usize>) -> LogResult<Vec<ExchangePair>> {
        Ok(to_pairs(&self.records()?, limit))
    }

    /// History as role-tagged messages
    pub fn load_messages(&self, limit: Option<usize>) -> LogResult<Vec<Message>> {
        Ok(to_messages(&self.records()?, limit))
    }

    pub fn stats(&self) -> LogResult<LogStats> {
        if !self.enabled {
            return Ok(LogStats::default());
        }
        self.log.stats()
    }

    /// Extended statistics including backups
    pub fn detailed_stats(&self) -> LogResult<MemoryStats> {
        if !self.enabled {
            return Ok(MemoryStats::default());
        }
        StatsCollector::new(self.log.config().clone()).collect()
    }

    /// Archive and clear the live log
    ///
    /// `None` when there was nothing to archive.
    pub fn backup(&self) -> LogResult<Option<PathBuf>> {
        if !self.enabled {
            return Ok(None);
        }
        self.backups.rotate()
    }

    pub fn list_backups(&self) -> LogResult<Vec<ArchiveInfo>> {
        self.backups.list_archives()
    }

    /// Delete all but the `keep` newest backups
    pub fn prune_backups(&self, keep: usize) -> LogResult<usize> {
        self.backups.prune(keep)
    }

    /// History as a Markdown transcript
    pub fn export_markdown(&self, limit: Option<usize>) -> LogResult<String> {
        Ok(render_markdown(&self.load_messages(limit)?, Utc::now()))
    }

    /// Write the transcript to `path`
    ///
    /// Returns the number of messages written; nothing is written when there
    /// is no history.
    pub fn export_to(&self, path: &Path, limit: Option<usize>) -> LogResult<usize> {
        let messages = self.load_messages(limit)?;
        if messages.is_empty() {
            return Ok(0);
        }
        atomic_write(path, &render_markdown(&messages, Utc::now()))?;
        tracing::info!(path = %path.display(), messages = messages.len(), "Conversation exported");
        Ok(messages.len())
    }
}
