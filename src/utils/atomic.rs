//! Atomic file operations
//!
//! Files that must never be observed half-written (backup archives, the
//! config file) go through the same sequence:
//!
//! 1. Write to a temporary file (.tmp)
//! 2. Call sync_all() to flush to disk
//! 3. Rename temp file to final path (atomic on most filesystems)
//!
//! The final path therefore holds either nothing or the complete content.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Atomically write content to a file
///
/// ```ignore
/// atomic_write("config.json", "{}\n")?;
/// ```
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> io::Result<()> {
    let path = path.as_ref();
    let temp_path = path.with_extension("tmp");

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(&temp_path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;

    fs::rename(&temp_path, path)?;
    sync_parent(path)
}

/// Durably copy `from` to `to`
///
/// The copy is complete and fsynced under its final name before this
/// returns; a crash midway leaves at most a stray `.tmp` file. Returns the
/// number of bytes copied.
pub fn atomic_copy<P1, P2>(from: P1, to: P2) -> io::Result<u64>
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
{
    let from = from.as_ref();
    let to = to.as_ref();
    let temp_path = to.with_extension("tmp");

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut source = File::open(from)?;
    let mut temp = File::create(&temp_path)?;
    let copied = io::copy(&mut source, &mut temp)?;
    temp.sync_all()?;
    drop(temp);

    fs::rename(&temp_path, to)?;
    sync_parent(to)?;

    Ok(copied)
}

/// Clean up any leftover temp files from interrupted operations
///
/// Call this on startup to clean up .tmp files that may have been
/// left behind from crashes.
pub fn cleanup_temp_files<P: AsRef<Path>>(dir: P) -> io::Result<usize> {
    let dir = dir.as_ref();
    let mut cleaned = 0;

    if !dir.exists() {
        return Ok(0);
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.extension().map(|e| e == "tmp").unwrap_or(false) {
            fs::remove_file(&path)?;
            cleaned += 1;
        }
    }

    Ok(cleaned)
}

/// Persist the directory entry created by a rename
#[cfg(unix)]
fn sync_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => File::open(parent)?.sync_all(),
        _ => Ok(()),
    }
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");

        atomic_write(&path, "{\"a\": 1}").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\"a\": 1}");

        // Temp file should not exist
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("subdir").join("nested").join("test.txt");

        atomic_write(&path, "nested content").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "nested content");
    }

    #[test]
    fn test_atomic_copy() {
        let temp_dir = TempDir::new().unwrap();
        let from = temp_dir.path().join("conversation_log.txt");
        let to = temp_dir.path().join("backups").join("conversation_1.txt");

        fs::write(&from, "line 1\nline 2\n").unwrap();

        let copied = atomic_copy(&from, &to).unwrap();
        assert_eq!(copied, 14);
        assert_eq!(fs::read_to_string(&to).unwrap(), "line 1\nline 2\n");
        assert!(!to.with_extension("tmp").exists());

        // Source is untouched
        assert_eq!(fs::read_to_string(&from).unwrap(), "line 1\nline 2\n");
    }

    #[test]
    fn test_cleanup_temp_files() {
        let temp_dir = TempDir::new().unwrap();

        fs::write(temp_dir.path().join("conversation_1.tmp"), "partial").unwrap();
        fs::write(temp_dir.path().join("conversation_2.tmp"), "partial").unwrap();
        fs::write(temp_dir.path().join("conversation_3.txt"), "keep").unwrap();

        let cleaned = cleanup_temp_files(temp_dir.path()).unwrap();
        assert_eq!(cleaned, 2);

        assert!(!temp_dir.path().join("conversation_1.tmp").exists());
        assert!(temp_dir.path().join("conversation_3.txt").exists());
    }
}
