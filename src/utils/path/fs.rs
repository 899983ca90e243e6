//! Path normalization utilities.
//!
//! Provides consistent path handling for configured directories:
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `resolve_path` - resolve a configured path against a base directory

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Resolve a configured path against `base`, with `~` expansion.
///
/// Always returns an absolute path.
///
/// # Example
/// ```ignore
/// // vanish.toml lives in /srv/site, `dir = "scripts"`
/// let dir = resolve_path(Path::new("scripts"), Path::new("/srv/site"));
/// assert_eq!(dir, PathBuf::from("/srv/site/scripts"));
/// ```
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(path.to_str().unwrap_or_default()).into_owned();
    let path = PathBuf::from(expanded);
    let full_path = if path.is_relative() {
        base.join(&path)
    } else {
        path
    };
    normalize_path(&full_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_resolve_path_absolute() {
        let resolved = resolve_path(Path::new("/absolute/path"), Path::new("/base"));
        assert_eq!(resolved, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_resolve_path_relative_to_base() {
        let resolved = resolve_path(Path::new("nonexistent/scripts"), Path::new("/base"));
        assert_eq!(resolved, PathBuf::from("/base/nonexistent/scripts"));
    }
}
