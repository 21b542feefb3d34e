//! Conversation log store
//!
//! The log file is the single source of truth: records are only ever
//! appended, and every read is a full linear scan. There is no index.
//!
//! Writes from one process are ordered; there is no cross-process lock, so
//! two processes appending to the same file may interleave.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::codec;
use crate::types::ExchangeRecord;
use crate::utils::atomic::cleanup_temp_files;

/// Name of the live log file inside the data directory
pub const LOG_FILE_NAME: &str = "conversation_log.txt";

/// Name of the backup directory inside the data directory
pub const BACKUP_DIR_NAME: &str = "backups";

/// Configuration for the conversation log
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Path to the data directory
    pub data_dir: PathBuf,
    /// fsync after every append
    pub sync_on_append: bool,
    /// Keep at most this many backup archives (None = keep all)
    pub max_backups: Option<usize>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("memory"),
            sync_on_append: true,
            max_backups: None,
        }
    }
}

impl LogConfig {
    /// Create config with custom data directory
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get path to conversation_log.txt
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }

    /// Get path to the backup directory
    pub fn backup_dir(&self) -> PathBuf {
        self.data_dir.join(BACKUP_DIR_NAME)
    }
}

/// Result type for log operations
pub type LogResult<T> = Result<T, LogError>;

/// Errors surfaced by the log store
///
/// Malformed lines are not errors; they are skipped while reading.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Record count and raw size of a log file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    /// Successfully decoded records
    pub count: usize,
    /// Raw file size in bytes
    pub size_bytes: u64,
}

/// Append-only conversation log
#[derive(Debug, Clone)]
pub struct ConversationLog {
    config: LogConfig,
}

impl ConversationLog {
    /// Open the log, creating the data directory, backup directory and an
    /// empty log file when absent
    ///
    /// Safe to call on every start: existing content is never touched.
    pub fn open(config: LogConfig) -> LogResult<Self> {
        fs::create_dir_all(config.data_dir())?;
        fs::create_dir_all(config.backup_dir())?;

        // create(true) without truncate leaves an existing log as it is
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(config.log_path())?;

        let cleaned = cleanup_temp_files(config.backup_dir())?;
        if cleaned > 0 {
            tracing::warn!(cleaned, "Removed leftover temp files from an interrupted backup");
        }

        Ok(Self { config })
    }

    /// Wrap a config without touching the filesystem
    ///
    /// Reads on a log that was never opened behave as if it were empty.
    pub fn from_config(config: LogConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Path of the live log file
    pub fn path(&self) -> PathBuf {
        self.config.log_path()
    }

    /// Append one record
    ///
    /// The encoded line goes out in a single write on a handle opened in
    /// append mode, so prior content is never rewritten.
    pub fn append(&self, record: &ExchangeRecord) -> LogResult<()> {
        let log_path = self.config.log_path();

        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&log_path)?;

        let mut line = codec::encode(record);
        if ends_mid_line(&mut file)? {
            // Terminate a torn last line so this record starts on its own
            line.insert(0, '\n');
        }
        file.write_all(line.as_bytes())?;

        if self.config.sync_on_append {
            file.sync_all()?;
        }

        tracing::debug!(role = %record.role, bytes = line.len(), "Appended record");
        Ok(())
    }

    /// Stream records in file order
    ///
    /// A missing log yields an empty stream.
    pub fn records(&self) -> LogResult<Records> {
        let log_path = self.config.log_path();
        let reader = match File::open(&log_path) {
            Ok(file) => Some(BufReader::new(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        Ok(Records {
            reader,
            line_num: 0,
            buf: Vec::new(),
        })
    }

    /// Load every decodable record, skipping malformed lines
    pub fn read_all(&self) -> LogResult<Vec<ExchangeRecord>> {
        self.records()?.collect()
    }

    /// Count decodable records and measure the file
    pub fn stats(&self) -> LogResult<LogStats> {
        let log_path = self.config.log_path();
        let size_bytes = match fs::metadata(&log_path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LogStats::default()),
            Err(e) => return Err(e.into()),
        };

        let mut count = 0;
        for record in self.records()? {
            record?;
            count += 1;
        }

        Ok(LogStats { count, size_bytes })
    }

    /// True when the log is missing or has no bytes
    pub fn is_empty(&self) -> LogResult<bool> {
        match fs::metadata(self.config.log_path()) {
            Ok(meta) => Ok(meta.len() == 0),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }
}

/// True when the file is non-empty and its last byte is not a newline
fn ends_mid_line(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Streaming reader over a log file
///
/// Yields decoded records in file order. Blank, truncated and non-UTF-8
/// lines are skipped; only I/O failures are yielded as errors.
pub struct Records {
    reader: Option<BufReader<File>>,
    line_num: usize,
    buf: Vec<u8>,
}

impl Records {
    /// Read records from an arbitrary file in log format
    pub fn from_path(path: &Path) -> LogResult<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: Some(BufReader::new(file)),
            line_num: 0,
            buf: Vec::new(),
        })
    }
}

impl Iterator for Records {
    type Item = LogResult<ExchangeRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;

        loop {
            self.buf.clear();
            match reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    // Stop after an I/O error rather than retrying forever
                    self.reader = None;
                    return Some(Err(e.into()));
                }
            }
            self.line_num += 1;

            let line = match std::str::from_utf8(&self.buf) {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(line = self.line_num, error = %e, "Skipping non-UTF-8 log line");
                    continue;
                }
            };

            match codec::decode(line) {
                Some(record) => return Some(Ok(record)),
                None => {
                    if !line.trim().is_empty() {
                        tracing::warn!(line = self.line_num, "Skipping malformed log line");
                    }
                }
            }
        }
    }
}
