//! Write-to-temp-then-rename file replacement.
//!
//! A reader of the target path at any instant sees either the fully-old or
//! the fully-new content, never a partial write. The rename-over-existing
//! step is atomic on POSIX; Windows replaces the target but does not
//! document atomicity, which is the one accepted portability risk here.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Sibling temporary path: `<path>.tmp`.
fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

/// Replace the contents of `path` with `contents` atomically.
///
/// The contents are written fully to `<path>.tmp`, flushed and synced to
/// the OS, and the temp file is renamed onto `path`. A partial temp file is
/// never considered done. The temp file is removed on every exit; a failed
/// removal is ignored (the rename normally consumes it).
pub fn atomic_replace(path: &Path, contents: &[u8]) -> io::Result<()> {
    let tmp = tmp_path(path);
    let result = write_then_rename(path, &tmp, contents);
    // Covers every failure exit; on success the rename already consumed it.
    let _ = fs::remove_file(&tmp);
    result
}

fn write_then_rename(path: &Path, tmp: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = File::create(tmp)?;
    file.write_all(contents)?;
    file.flush()?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("target.txt");
        fs::write(&path, b"old").unwrap();

        atomic_replace(&path, b"new").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn creates_missing_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.txt");

        atomic_replace(&path, b"content").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"content");
    }

    #[test]
    fn temp_file_is_gone_after_replace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("target.txt");

        atomic_replace(&path, b"content").unwrap();
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn failed_write_leaves_target_intact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("target.txt");
        fs::write(&path, b"original").unwrap();

        // Occupy the temp path with a directory so the write cannot start.
        fs::create_dir(tmp_path(&path)).unwrap();

        let result = atomic_replace(&path, b"replacement");
        assert!(result.is_err());
        assert_eq!(fs::read(&path).unwrap(), b"original");
    }
}
