//! Filesystem roots and the locations of unit outputs within them.
//!
//! Every kind has two roots: the *source* root its units are read from and the
//! *cache* root relocated and combined artifacts are written to. A root pairs a
//! directory with the HTTP prefix it is served under.

use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use super::AssetKind;
use crate::utils::path::to_slash;

/// Characters escaped in href path segments (RFC 3986 unreserved stay as-is).
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Default name of the cache directory below a source root.
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// A directory and the URL prefix it is served under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    pub dir: PathBuf,
    pub url: String,
}

impl Root {
    pub fn new(dir: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url: url.into(),
        }
    }

    /// Filesystem path of `rel` below this root.
    pub fn path(&self, rel: &Path) -> PathBuf {
        self.dir.join(rel)
    }

    /// Href of `rel` below this root, segments percent-encoded.
    ///
    /// # Examples
    /// ```ignore
    /// let root = Root::new("public/js", "/js");
    /// assert_eq!(root.href(Path::new("lib/my menu.js")), "/js/lib/my%20menu.js");
    /// ```
    pub fn href(&self, rel: &Path) -> String {
        let encoded = to_slash(rel)
            .split('/')
            .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");

        if self.url.is_empty() {
            encoded
        } else if self.url.ends_with('/') {
            format!("{}{encoded}", self.url)
        } else {
            format!("{}/{encoded}", self.url)
        }
    }
}

/// Source and cache roots of one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindRoots {
    pub source: Root,
    pub cache: Root,
}

impl KindRoots {
    /// Roots with the cache at `<source>/cache`.
    pub fn new(source: Root) -> Self {
        let cache = Root {
            dir: source.dir.join(DEFAULT_CACHE_DIR),
            url: format!("{}/{DEFAULT_CACHE_DIR}", source.url.trim_end_matches('/')),
        };
        Self { source, cache }
    }

    pub fn with_cache(source: Root, cache: Root) -> Self {
        Self { source, cache }
    }

    pub fn root(&self, anchor: Anchor) -> &Root {
        match anchor {
            Anchor::Source => &self.source,
            Anchor::Cache => &self.cache,
        }
    }
}

/// Roots for every kind, passed explicitly to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRoots {
    pub scripts: KindRoots,
    pub styles: KindRoots,
}

impl AssetRoots {
    pub fn new(scripts: KindRoots, styles: KindRoots) -> Self {
        Self { scripts, styles }
    }

    /// Both kinds below one base directory: `<base>/scripts` and `<base>/styles`,
    /// served under `/scripts` and `/styles`.
    pub fn under(base: &Path) -> Self {
        Self {
            scripts: KindRoots::new(Root::new(base.join("scripts"), "/scripts")),
            styles: KindRoots::new(Root::new(base.join("styles"), "/styles")),
        }
    }

    pub fn for_kind(&self, kind: AssetKind) -> &KindRoots {
        match kind {
            AssetKind::Script => &self.scripts,
            AssetKind::Style => &self.styles,
        }
    }
}

/// Which root a location is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Source,
    Cache,
}

/// Root-relative location of a unit's current output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub anchor: Anchor,
    pub rel: PathBuf,
}

impl Location {
    pub fn source(rel: impl Into<PathBuf>) -> Self {
        Self {
            anchor: Anchor::Source,
            rel: rel.into(),
        }
    }

    pub fn cache(rel: impl Into<PathBuf>) -> Self {
        Self {
            anchor: Anchor::Cache,
            rel: rel.into(),
        }
    }

    /// Same directory, different filename.
    pub fn with_file_name(&self, name: &str) -> Self {
        Self {
            anchor: self.anchor,
            rel: self.rel.with_file_name(name),
        }
    }

    /// Bare filename, empty if the location has none.
    pub fn file_name(&self) -> String {
        self.rel
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn path(&self, roots: &KindRoots) -> PathBuf {
        roots.root(self.anchor).path(&self.rel)
    }

    pub fn href(&self, roots: &KindRoots) -> String {
        roots.root(self.anchor).href(&self.rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cache_root() {
        let roots = KindRoots::new(Root::new("/srv/app/js", "/js/"));
        assert_eq!(roots.cache.dir, PathBuf::from("/srv/app/js/cache"));
        assert_eq!(roots.cache.url, "/js/cache");
    }

    #[test]
    fn test_href_joins_prefix() {
        let root = Root::new("js", "/js");
        assert_eq!(root.href(Path::new("lib/menu.v1.js")), "/js/lib/menu.v1.js");

        let slashed = Root::new("js", "https://cdn.example.com/");
        assert_eq!(slashed.href(Path::new("a.js")), "https://cdn.example.com/a.js");

        let bare = Root::new("js", "");
        assert_eq!(bare.href(Path::new("a.js")), "a.js");
    }

    #[test]
    fn test_href_encodes_segments() {
        let root = Root::new("css", "/css");
        assert_eq!(
            root.href(Path::new("thème/my site.css")),
            "/css/th%C3%A8me/my%20site.css"
        );
    }

    #[test]
    fn test_location_resolves_against_anchor() {
        let roots = KindRoots::with_cache(
            Root::new("/src/js", "/js"),
            Root::new("/out/js", "//cdn/js"),
        );

        let source = Location::source("lib/menu.js");
        assert_eq!(source.path(&roots), PathBuf::from("/src/js/lib/menu.js"));
        assert_eq!(source.href(&roots), "/js/lib/menu.js");

        let cached = Location::cache("lib-menu.js").with_file_name("lib-menu.v2.js");
        assert_eq!(cached.path(&roots), PathBuf::from("/out/js/lib-menu.v2.js"));
        assert_eq!(cached.href(&roots), "//cdn/js/lib-menu.v2.js");
        assert_eq!(cached.file_name(), "lib-menu.v2.js");
    }

    #[test]
    fn test_for_kind() {
        let roots = AssetRoots::under(Path::new("/site"));
        assert_eq!(
            roots.for_kind(AssetKind::Style).source.dir,
            PathBuf::from("/site/styles")
        );
        assert_eq!(roots.for_kind(AssetKind::Script).source.url, "/scripts");
    }
}
