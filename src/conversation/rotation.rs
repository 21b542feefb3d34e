//! Backup rotation and archive management
//!
//! Provides functionality for:
//! - Rotating the live log into a timestamped archive
//! - Listing archives
//! - Pruning old archives
//!
//! A rotation copies the log to `backups/conversation_<stamp>.txt`, fsyncs
//! the copy, and only then truncates the live log. A crash between the two
//! steps leaves the log intact next to its backup; it never loses both.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::store::{LogConfig, LogResult, Records};
use crate::utils::atomic::atomic_copy;
use crate::utils::time::archive_stamp;

const ARCHIVE_PREFIX: &str = "conversation_";
const ARCHIVE_EXTENSION: &str = "txt";

/// Backup manager for the conversation log
#[derive(Debug, Clone)]
pub struct BackupManager {
    config: LogConfig,
}

impl BackupManager {
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }

    /// Archive the live log and clear it
    ///
    /// # Returns
    /// * `Ok(Some(path))` - Path to the new archive
    /// * `Ok(None)` - The log was empty or absent; nothing was written
    pub fn rotate(&self) -> LogResult<Option<PathBuf>> {
        self.rotate_at(Utc::now())
    }

    /// Same as [`rotate`](Self::rotate) with an explicit rotation time
    pub fn rotate_at(&self, now: DateTime<Utc>) -> LogResult<Option<PathBuf>> {
        let log_path = self.config.log_path();

        let size = match fs::metadata(&log_path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if size == 0 {
            return Ok(None);
        }

        let backup_dir = self.config.backup_dir();
        fs::create_dir_all(&backup_dir)?;

        let archive_path = self.unique_archive_path(&backup_dir, now);
        let copied = atomic_copy(&log_path, &archive_path)?;

        // The archive is durable; now it is safe to clear the live log
        let log_file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&log_path)?;
        log_file.sync_all()?;

        tracing::info!(
            archive = %archive_path.display(),
            bytes = copied,
            "Conversation backed up"
        );

        // The rotation has succeeded at this point; pruning is housekeeping
        if let Some(keep) = self.config.max_backups {
            if let Err(e) = self.prune_older_than(&archive_path, keep) {
                tracing::warn!(error = %e, "Failed to prune old backups");
            }
        }

        Ok(Some(archive_path))
    }

    /// First unused archive name for this stamp: `conversation_<stamp>.txt`,
    /// then `conversation_<stamp>_1.txt`, `_2`, ...
    fn unique_archive_path(&self, backup_dir: &Path, now: DateTime<Utc>) -> PathBuf {
        let stamp = archive_stamp(now);
        let first = backup_dir.join(format!("{ARCHIVE_PREFIX}{stamp}.{ARCHIVE_EXTENSION}"));
        if !first.exists() {
            return first;
        }

        (1u32..)
            .map(|n| backup_dir.join(format!("{ARCHIVE_PREFIX}{stamp}_{n}.{ARCHIVE_EXTENSION}")))
            .find(|path| !path.exists())
            .unwrap_or(first)
    }

    /// List all archive files, oldest first
    pub fn list_archives(&self) -> LogResult<Vec<ArchiveInfo>> {
        let backup_dir = self.config.backup_dir();

        if !backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut archives = Vec::new();

        for entry in fs::read_dir(&backup_dir)? {
            let entry = entry?;
            let path = entry.path();

            if !is_archive(&path) {
                continue;
            }

            let size = entry.metadata()?.len();
            let record_count = Records::from_path(&path)?.filter(|r| r.is_ok()).count();

            archives.push(ArchiveInfo {
                path,
                size,
                record_count,
            });
        }

        archives.sort_by(|a, b| archive_order(&a.path).cmp(&archive_order(&b.path)));

        Ok(archives)
    }

    /// Delete all but the `keep_count` newest archives
    ///
    /// Returns the number of archives deleted.
    pub fn prune(&self, keep_count: usize) -> LogResult<usize> {
        delete_oldest(&self.list_archives()?, keep_count)
    }

    /// Prune after a rotation
    ///
    /// `fresh` always survives and counts towards `keep_count`, so a limit
    /// of 0 behaves like 1.
    fn prune_older_than(&self, fresh: &Path, keep_count: usize) -> LogResult<usize> {
        let others: Vec<ArchiveInfo> = self
            .list_archives()?
            .into_iter()
            .filter(|a| a.path != fresh)
            .collect();
        delete_oldest(&others, keep_count.max(1) - 1)
    }
}

/// Delete all but the last `keep_count` entries of an oldest-first list
fn delete_oldest(archives: &[ArchiveInfo], keep_count: usize) -> LogResult<usize> {
    if archives.len() <= keep_count {
        return Ok(0);
    }

    let to_delete = &archives[..archives.len() - keep_count];
    for archive in to_delete {
        fs::remove_file(&archive.path)?;
        tracing::info!(archive = %archive.path.display(), "Deleted old backup");
    }

    Ok(to_delete.len())
}

fn is_archive(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    name.starts_with(ARCHIVE_PREFIX)
        && path.extension().and_then(|s| s.to_str()) == Some(ARCHIVE_EXTENSION)
}

/// Sort key: (stamp, collision suffix), so `_10` sorts after `_9`
fn archive_order(path: &Path) -> (String, u32) {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .trim_start_matches(ARCHIVE_PREFIX);

    // Stamp is YYYYMMDD_HHMMSS; anything after it is the suffix
    match stem.get(15..).and_then(|rest| rest.strip_prefix('_')) {
        Some(suffix) => (
            stem[..15].to_string(),
            suffix.parse().unwrap_or(u32::MAX),
        ),
        None => (stem.to_string(), 0),
    }
}

/// Information about an archive file
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveInfo {
    /// Path to the archive file
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Number of decodable records in the archive
    pub record_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::store::ConversationLog;
    use crate::types::ExchangeRecord;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn setup() -> (ConversationLog, BackupManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = LogConfig::new(temp_dir.path().join("memory"));
        let log = ConversationLog::open(config.clone()).unwrap();
        (log, BackupManager::new(config), temp_dir)
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_rotate_copies_then_clears() {
        let (log, backups, _temp_dir) = setup();
        log.append(&ExchangeRecord::user("u", "hello")).unwrap();
        log.append(&ExchangeRecord::assistant("hi")).unwrap();
        let before = fs::read(log.path()).unwrap();

        let archive = backups.rotate_at(fixed_time()).unwrap().unwrap();

        assert_eq!(
            archive.file_name().unwrap().to_str().unwrap(),
            "conversation_20261016_093000.txt"
        );
        assert_eq!(fs::read(&archive).unwrap(), before);
        assert!(log.is_empty().unwrap());
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_rotate_empty_log_is_noop() {
        let (_log, backups, _temp_dir) = setup();

        assert!(backups.rotate().unwrap().is_none());
        assert!(backups.list_archives().unwrap().is_empty());
    }

    #[test]
    fn test_rotate_missing_log_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let backups = BackupManager::new(LogConfig::new(temp_dir.path().join("absent")));

        assert!(backups.rotate().unwrap().is_none());
    }

    #[test]
    fn test_rotate_same_second_never_overwrites() {
        let (log, backups, _temp_dir) = setup();

        let mut paths = Vec::new();
        for text in ["first", "second", "third"] {
            log.append(&ExchangeRecord::user("u", text)).unwrap();
            paths.push(backups.rotate_at(fixed_time()).unwrap().unwrap());
        }

        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "conversation_20261016_093000.txt",
                "conversation_20261016_093000_1.txt",
                "conversation_20261016_093000_2.txt",
            ]
        );

        for (path, text) in paths.iter().zip(["first", "second", "third"]) {
            let records: Vec<_> = Records::from_path(path).unwrap().map(|r| r.unwrap()).collect();
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].text, text);
        }
    }

    #[test]
    fn test_list_archives_ordering() {
        let (_log, backups, _temp_dir) = setup();
        let dir = backups.config.backup_dir();

        fs::write(dir.join("conversation_20260101_000000_10.txt"), "").unwrap();
        fs::write(dir.join("conversation_20260101_000000_9.txt"), "").unwrap();
        fs::write(dir.join("conversation_20260101_000000.txt"), "ts\tuser\tu\tx\n").unwrap();
        fs::write(dir.join("notes.md"), "not an archive").unwrap();

        let archives = backups.list_archives().unwrap();
        let names: Vec<String> = archives
            .iter()
            .map(|a| a.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "conversation_20260101_000000.txt",
                "conversation_20260101_000000_9.txt",
                "conversation_20260101_000000_10.txt",
            ]
        );
        assert_eq!(archives[0].record_count, 1);
    }

    #[test]
    fn test_prune_keeps_newest() {
        let (_log, backups, _temp_dir) = setup();
        let dir = backups.config.backup_dir();

        fs::write(dir.join("conversation_20260101_000000.txt"), "a").unwrap();
        fs::write(dir.join("conversation_20260102_000000.txt"), "b").unwrap();
        fs::write(dir.join("conversation_20260103_000000.txt"), "c").unwrap();

        let deleted = backups.prune(2).unwrap();
        assert_eq!(deleted, 1);

        let remaining = backups.list_archives().unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(!dir.join("conversation_20260101_000000.txt").exists());
    }

    #[test]
    fn test_rotate_applies_max_backups() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = LogConfig::new(temp_dir.path().join("memory"));
        config.max_backups = Some(1);
        let log = ConversationLog::open(config.clone()).unwrap();
        let backups = BackupManager::new(config);

        log.append(&ExchangeRecord::user("u", "old")).unwrap();
        backups.rotate_at(fixed_time()).unwrap();
        log.append(&ExchangeRecord::user("u", "new")).unwrap();
        let latest = backups.rotate_at(fixed_time()).unwrap().unwrap();

        let archives = backups.list_archives().unwrap();
        assert_eq!(archives.len(), 1);
        assert_eq!(archives[0].path, latest);
    }

    #[test]
    fn test_max_backups_zero_keeps_fresh_archive() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = LogConfig::new(temp_dir.path().join("memory"));
        config.max_backups = Some(0);
        let log = ConversationLog::open(config.clone()).unwrap();
        let backups = BackupManager::new(config);

        log.append(&ExchangeRecord::user("u", "precious")).unwrap();
        let archive = backups.rotate().unwrap().unwrap();

        assert!(archive.exists());
        let records: Vec<_> = Records::from_path(&archive).unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(records[0].text, "precious");
    }

    #[test]
    fn test_prune_after_rotate_spares_fresh_archive_with_older_stamp() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = LogConfig::new(temp_dir.path().join("memory"));
        config.max_backups = Some(1);
        let log = ConversationLog::open(config.clone()).unwrap();
        let backups = BackupManager::new(config);

        // An archive stamped in the future sorts after the one about to be written
        let future = backups.config.backup_dir().join("conversation_20991231_235959.txt");
        fs::write(&future, "ts\tuser\tu\tlater\n").unwrap();

        log.append(&ExchangeRecord::user("u", "now")).unwrap();
        let archive = backups.rotate_at(fixed_time()).unwrap().unwrap();

        assert!(archive.exists());
        assert!(!future.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_prune_failure_does_not_fail_rotation() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = LogConfig::new(temp_dir.path().join("memory"));
        config.max_backups = Some(1);
        let log = ConversationLog::open(config.clone()).unwrap();
        let backups = BackupManager::new(config);

        // A directory with an archive name cannot be removed with remove_file
        let stuck = backups.config.backup_dir().join("conversation_20000101_000000.txt");
        fs::create_dir(&stuck).unwrap();

        log.append(&ExchangeRecord::user("u", "hello")).unwrap();
        let archive = backups.rotate_at(fixed_time()).unwrap().unwrap();

        assert!(archive.exists());
        assert!(stuck.exists());
        assert!(log.is_empty().unwrap());
    }
}
