//! Stale artifact collection.

use std::fs;
use std::path::Path;

use super::name::StalePattern;
use super::registry::EmittedArtifacts;
use crate::debug;
use crate::freshness::digest_path;

/// Removes superseded artifacts.
///
/// The default [`DirectoryScan`] recognizes stale files by name alone. An
/// implementation backed by a manifest of written artifacts can replace it
/// without touching the pipeline.
pub trait StaleCollector: Send + Sync {
    /// Delete files in `dir` matching `pattern`, except those in `keep`.
    ///
    /// Returns the number of files removed. Failures are not reported.
    fn collect(&self, dir: &Path, pattern: &StalePattern, keep: &EmittedArtifacts) -> usize;
}

/// Scans one directory (not recursive) and deletes regular files whose name
/// matches the pattern. A deleted artifact's digest sidecar goes with it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryScan;

impl StaleCollector for DirectoryScan {
    fn collect(&self, dir: &Path, pattern: &StalePattern, keep: &EmittedArtifacts) -> usize {
        let Ok(entries) = fs::read_dir(dir) else {
            return 0;
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if keep.contains(&path) || !entry.file_type().is_ok_and(|t| t.is_file()) {
                continue;
            }
            let name = entry.file_name();
            if !pattern.matches(&name.to_string_lossy()) {
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => {
                    removed += 1;
                    debug!("clean"; "removed {}", path.display());
                    let _ = fs::remove_file(digest_path(&path));
                }
                Err(e) => debug!("clean"; "could not remove {}: {}", path.display(), e),
            }
        }
        removed
    }
}
