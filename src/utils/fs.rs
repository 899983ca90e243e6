//! Filesystem primitives for generated artifacts.
//!
//! - [`atomic_write`] / [`atomic_copy`]: temp-file-then-rename writes, so a reader
//!   never observes a half-written artifact under its final name.
//! - [`with_path_lock`]: in-process mutual exclusion keyed by target path, so two
//!   renders in the same process never generate the same artifact concurrently.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use parking_lot::Mutex;
use tempfile::NamedTempFile;

/// Target path → generation lock.
///
/// Entries are never removed; the key space is bounded by the set of artifact
/// names a process generates.
static PATH_LOCKS: LazyLock<DashMap<PathBuf, Arc<Mutex<()>>>> = LazyLock::new(DashMap::new);

/// Run `f` while holding the lock for `path`.
pub fn with_path_lock<T>(path: &Path, f: impl FnOnce() -> T) -> T {
    // Clone the Arc out first: the map shard must not stay borrowed while we block.
    let lock = PATH_LOCKS.entry(path.to_path_buf()).or_default().clone();
    let _guard = lock.lock();
    f()
}

/// Atomically write bytes to `path`.
///
/// Content goes to a temporary file in the destination directory, is synced,
/// then renamed over `path`. Parent directories are created as needed.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Atomically copy `from` to `to`, replacing any existing file.
pub fn atomic_copy(from: &Path, to: &Path) -> io::Result<()> {
    let content = fs::read(from)?;
    atomic_write(to, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_new_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.v1.js");

        atomic_write(&path, b"let a = 1;").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "let a = 1;");
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache/nested/app.js");

        atomic_write(&path, b"x").unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_atomic_write_replaces_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.css");
        fs::write(&path, "old").unwrap();

        atomic_write(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_atomic_copy() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("a.js");
        let to = dir.path().join("cache/a.js");
        fs::write(&from, "source").unwrap();

        atomic_copy(&from, &to).unwrap();

        assert_eq!(fs::read_to_string(&to).unwrap(), "source");
        assert!(from.exists());
    }

    #[test]
    fn test_atomic_copy_missing_source() {
        let dir = TempDir::new().unwrap();
        let err = atomic_copy(&dir.path().join("nope.js"), &dir.path().join("out.js"));
        assert_eq!(err.unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_path_lock_serializes_same_path() {
        let dir = TempDir::new().unwrap();
        let path = Arc::new(dir.path().join("shared.comb.js"));
        let active = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let path = Arc::clone(&path);
                let active = Arc::clone(&active);
                let max_seen = Arc::clone(&max_seen);
                thread::spawn(move || {
                    with_path_lock(&path, || {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(std::time::Duration::from_millis(2));
                        active.fetch_sub(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_path_lock_returns_value() {
        let value = with_path_lock(Path::new("/virtual/value.js"), || 42);
        assert_eq!(value, 42);
    }
}
