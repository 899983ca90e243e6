//! What one render call has emitted so far.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

/// Set of unit identities already referenced by emitted markup.
///
/// Created fresh by every `render()` so a unit shared between groups is
/// referenced once per page, and never carried over to the next request.
#[derive(Debug, Default)]
pub struct RenderedRegistry {
    seen: FxHashSet<String>,
}

impl RenderedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn contains(&self, identity: &str) -> bool {
        self.seen.contains(identity)
    }

    /// Record `identity`. Returns `false` if it was already present.
    pub fn insert(&mut self, identity: &str) -> bool {
        if self.seen.contains(identity) {
            return false;
        }
        self.seen.insert(identity.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Artifact paths written or reused by the current render call.
///
/// Stale collection never deletes these: differently named artifacts can
/// still match another unit's pattern (`main2.js` v1 and `main.js` v21 both
/// combine to `main21`), and markup already returned must stay valid.
#[derive(Debug, Default)]
pub struct EmittedArtifacts {
    paths: Mutex<FxHashSet<PathBuf>>,
}

impl EmittedArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: &Path) {
        self.paths.lock().insert(path.to_path_buf());
    }

    #[inline]
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.lock().contains(path)
    }

    /// Forget everything, as at the start of a new render call.
    pub fn clear(&self) {
        self.paths.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.paths.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.lock().is_empty()
    }
}

impl FromIterator<PathBuf> for EmittedArtifacts {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self {
            paths: Mutex::new(iter.into_iter().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitted_artifacts() {
        let emitted: EmittedArtifacts = [PathBuf::from("/c/x1.comb.js")].into_iter().collect();
        emitted.insert(Path::new("/c/y.v2.pack.js"));
        emitted.insert(Path::new("/c/x1.comb.js"));

        assert_eq!(emitted.len(), 2);
        assert!(emitted.contains(Path::new("/c/y.v2.pack.js")));
        assert!(!emitted.contains(Path::new("/c/y.v1.pack.js")));
    }

    #[test]
    fn test_insert_once() {
        let mut registry = RenderedRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.insert("lib/menu.js"));
        assert!(!registry.insert("lib/menu.js"));
        assert!(registry.contains("lib/menu.js"));
        assert!(!registry.contains("menu.js"));
        assert_eq!(registry.len(), 1);
    }
}
