//! Conversation log statistics
//!
//! Provides statistics about the log including:
//! - Record counts, overall and by role
//! - Storage size of the live log and of the backups

use std::collections::BTreeMap;

use serde::Serialize;

use super::rotation::BackupManager;
use super::store::{ConversationLog, LogConfig, LogResult};

/// Statistics about the live log and its backups
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    /// Decodable records in the live log
    pub record_count: usize,
    /// Size of the live log in bytes
    pub log_size: u64,
    /// Records in the live log by role
    pub records_by_role: BTreeMap<String, usize>,
    /// Number of backup archives
    pub backup_count: usize,
    /// Records across all backups
    pub backup_record_count: usize,
    /// Total size of backups in bytes
    pub backup_size: u64,
}

impl MemoryStats {
    /// Calculate total records, live and archived
    pub fn total_records(&self) -> usize {
        self.record_count + self.backup_record_count
    }

    /// Calculate total storage size
    pub fn total_size(&self) -> u64 {
        self.log_size + self.backup_size
    }
}

/// Format size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Collector for log statistics
pub struct StatsCollector {
    config: LogConfig,
}

impl StatsCollector {
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }

    /// Collect all statistics
    ///
    /// Missing files count as empty.
    pub fn collect(&self) -> LogResult<MemoryStats> {
        let mut stats = MemoryStats::default();

        let log = ConversationLog::from_config(self.config.clone());
        stats.log_size = log.stats()?.size_bytes;
        for record in log.records()? {
            let record = record?;
            stats.record_count += 1;
            *stats
                .records_by_role
                .entry(record.role.as_str().to_string())
                .or_insert(0) += 1;
        }

        let backups = BackupManager::new(self.config.clone());
        let archives = backups.list_archives()?;
        stats.backup_count = archives.len();
        stats.backup_record_count = archives.iter().map(|a| a.record_count).sum();
        stats.backup_size = archives.iter().map(|a| a.size).sum();

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExchangeRecord, Role};
    use tempfile::TempDir;

    #[test]
    fn test_collect_stats() {
        let temp_dir = TempDir::new().unwrap();
        let config = LogConfig::new(temp_dir.path().join("memory"));
        let log = ConversationLog::open(config.clone()).unwrap();

        log.append(&ExchangeRecord::user("u", "one")).unwrap();
        log.append(&ExchangeRecord::assistant("two")).unwrap();
        BackupManager::new(config.clone()).rotate().unwrap();

        log.append(&ExchangeRecord::user("u", "three")).unwrap();
        log.append(&ExchangeRecord::new(Role::from("system"), "", "note")).unwrap();

        let stats = StatsCollector::new(config).collect().unwrap();

        assert_eq!(stats.record_count, 2);
        assert!(stats.log_size > 0);
        assert_eq!(stats.records_by_role.get("user"), Some(&1));
        assert_eq!(stats.records_by_role.get("system"), Some(&1));
        assert_eq!(stats.backup_count, 1);
        assert_eq!(stats.backup_record_count, 2);
        assert_eq!(stats.total_records(), 4);
        assert_eq!(stats.total_size(), stats.log_size + stats.backup_size);
    }

    #[test]
    fn test_collect_on_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let config = LogConfig::new(temp_dir.path().join("nothing-here"));

        let stats = StatsCollector::new(config).collect().unwrap();
        assert_eq!(stats.record_count, 0);
        assert_eq!(stats.log_size, 0);
        assert_eq!(stats.backup_count, 0);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
        assert_eq!(format_size(1073741824), "1.00 GB");
    }
}
