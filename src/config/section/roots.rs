//! `[scripts]` and `[styles]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [scripts]
//! source = { dir = "public/js", url = "/js" }
//! cache = { dir = "public/js/cache", url = "/js/cache" }   # optional
//! ```
//!
//! Without `cache`, artifacts go to `<source>/cache`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::asset::{KindRoots, Root};
use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::path::resolve_path;

/// A directory and the URL prefix it is served under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootEntry {
    pub dir: PathBuf,
    #[serde(default)]
    pub url: String,
}

impl RootEntry {
    pub fn new(dir: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url: url.into(),
        }
    }

    fn normalize(&mut self, base: &Path) {
        self.dir = resolve_path(&self.dir, base);
    }

    fn to_root(&self) -> Root {
        Root::new(self.dir.clone(), self.url.clone())
    }
}

/// Roots of one asset kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindConfig {
    pub source: RootEntry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<RootEntry>,
}

impl KindConfig {
    pub fn new(dir: &str, url: &str) -> Self {
        Self {
            source: RootEntry::new(dir, url),
            cache: None,
        }
    }

    /// Default `[scripts]`: `scripts/` served under `/scripts`.
    pub fn scripts() -> Self {
        Self::new("scripts", "/scripts")
    }

    /// Default `[styles]`: `styles/` served under `/styles`.
    pub fn styles() -> Self {
        Self::new("styles", "/styles")
    }

    /// Resolve directories against `base` (the config file's directory).
    pub fn normalize(&mut self, base: &Path) {
        self.source.normalize(base);
        if let Some(cache) = &mut self.cache {
            cache.normalize(base);
        }
    }

    pub fn validate(&self, section: FieldPath, diag: &mut ConfigDiagnostics) {
        if self.source.dir.as_os_str().is_empty() {
            diag.error(section.join("source").join("dir"), "directory must not be empty");
        }
        if let Some(cache) = &self.cache
            && cache.dir == self.source.dir
        {
            diag.error_with_hint(
                section.join("cache").join("dir"),
                "cache directory must differ from the source directory",
                "omit `cache` to use `<source>/cache`",
            );
        }
    }

    pub fn roots(&self) -> KindRoots {
        match &self.cache {
            Some(cache) => KindRoots::with_cache(self.source.to_root(), cache.to_root()),
            None => KindRoots::new(self.source.to_root()),
        }
    }
}
