//! Stylesheet `@import` inlining.
//!
//! `@import url("menu.css");` is replaced by the imported file's content. A
//! path is looked up below the kind's source root first (a leading `/` is
//! dropped), then next to the importing file. Two passes are made, so imports
//! of imported files are inlined too; anything deeper, remote, or unresolvable
//! is left untouched.

use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::TransformOptions;
use crate::debug;

/// Number of inlining passes.
pub const MAX_DEPTH: usize = 2;

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@import\s+url\(\s*["']?([^"')\s]+)["']?\s*\)\s*;"#).unwrap()
});

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

/// Inline local `@import url(...)` statements in `css`.
///
/// Block comments are stripped before each pass so commented-out imports are
/// not pulled in.
pub fn inline_imports(css: &str, options: &TransformOptions) -> String {
    let mut out = css.to_string();
    for _ in 0..MAX_DEPTH {
        let stripped = COMMENT_RE.replace_all(&out, "").into_owned();
        if !IMPORT_RE.is_match(&stripped) {
            return stripped;
        }
        out = IMPORT_RE
            .replace_all(&stripped, |caps: &Captures| {
                load_import(&caps[1], options).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned();
    }
    out
}

fn load_import(target: &str, options: &TransformOptions) -> Option<String> {
    if target.starts_with("//") || target.contains("://") || target.starts_with("data:") {
        return None;
    }

    let rel = target.trim_start_matches('/');
    let content = candidates(rel, options)
        .into_iter()
        .find(|path| path.is_file())
        .and_then(|path| fs::read_to_string(&path).ok());

    if content.is_none() {
        debug!("import"; "left unresolved: {}", target);
    }
    content
}

fn candidates(rel: &str, options: &TransformOptions) -> Vec<PathBuf> {
    let mut paths = vec![options.import_root.join(rel)];
    if let Some(dir) = options.origin.parent() {
        paths.push(dir.join(rel));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn options(root: &Path, origin: &str) -> TransformOptions {
        TransformOptions {
            origin: root.join(origin),
            import_root: root.to_path_buf(),
        }
    }

    #[test]
    fn test_inline_from_source_root() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("reset.css"), "body{margin:0}").unwrap();

        let out = inline_imports(
            "@import url(\"/reset.css\");\na{color:red}",
            &options(dir.path(), "site.css"),
        );
        assert_eq!(out, "body{margin:0}\na{color:red}");
    }

    #[test]
    fn test_inline_next_to_importing_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("theme")).unwrap();
        fs::write(dir.path().join("theme/colors.css"), ".x{}").unwrap();

        let out = inline_imports(
            "@import url('colors.css');",
            &options(dir.path(), "theme/main.css"),
        );
        assert_eq!(out, ".x{}");
    }

    #[test]
    fn test_two_levels_then_stop() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.css"), "@import url(\"b.css\");").unwrap();
        fs::write(dir.path().join("b.css"), "@import url(\"c.css\");").unwrap();
        fs::write(dir.path().join("c.css"), ".c{}").unwrap();

        let out = inline_imports("@import url(\"a.css\");", &options(dir.path(), "s.css"));
        assert_eq!(out, "@import url(\"c.css\");");
    }

    #[test]
    fn test_unresolvable_and_remote_left_alone() {
        let dir = TempDir::new().unwrap();
        let css = "@import url(\"missing.css\");@import url(\"https://cdn.example.com/x.css\");";
        assert_eq!(inline_imports(css, &options(dir.path(), "s.css")), css);
    }

    #[test]
    fn test_commented_import_dropped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.css"), ".a{}").unwrap();

        let out = inline_imports("/* @import url(\"a.css\"); */.b{}", &options(dir.path(), "s.css"));
        assert_eq!(out, ".b{}");
    }
}
