//! Relative-path helpers for asset identities and generated filenames.
//!
//! Asset sources are configured as paths relative to a source root. These helpers
//! turn them into stable strings regardless of the host path separator.

use std::path::{Component, Path};

/// Join the normal components of a relative path with `/`.
///
/// `.` and `..` components and any root prefix are dropped, so the result is
/// identical on every platform.
///
/// # Examples
/// ```ignore
/// assert_eq!(to_slash(Path::new("lib/menu.js")), "lib/menu.js");
/// assert_eq!(to_slash(Path::new("./init.js")), "init.js");
/// ```
pub fn to_slash(path: &Path) -> String {
    join_normal(path, "/")
}

/// Flatten a relative path into a single filename by replacing separators with `-`.
///
/// Keeps same-named files from different directories apart once they share one
/// directory: `a/util.js` and `b/util.js` become `a-util.js` and `b-util.js`.
///
/// # Examples
/// ```ignore
/// assert_eq!(flatten_separators(Path::new("scripts/lib/menu.js")), "scripts-lib-menu.js");
/// ```
pub fn flatten_separators(path: &Path) -> String {
    join_normal(path, "-")
}

/// Split a filename into stem and extension at the last `.`.
///
/// A leading dot does not start an extension (`.hidden` has no extension).
///
/// # Examples
/// ```ignore
/// assert_eq!(split_stem("menu.v2.js"), ("menu.v2", Some("js")));
/// assert_eq!(split_stem("README"), ("README", None));
/// ```
pub fn split_stem(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => (&name[..pos], Some(&name[pos + 1..])),
        _ => (name, None),
    }
}

fn join_normal(path: &Path, sep: &str) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(sep)
}
