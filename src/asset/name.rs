//! Artifact naming.
//!
//! Pure functions mapping `(stem, version, flags)` to the filename a unit's
//! artifact gets, plus the [`StalePattern`]s that recognize earlier versions of
//! the same artifact. The filename is the only cache key the pipeline has, so
//! every function here is deterministic and free of I/O.
//!
//! | artifact  | name                                  |
//! |-----------|---------------------------------------|
//! | versioned | `menu.v1-2.js`                        |
//! | packed    | `menu.v1-2.pack.js` (`menu.pack.js`)  |
//! | combined  | `init1-0_menu1-2.comb.js`             |

use regex::Regex;

use super::{AssetKind, ProcessFlags};
use crate::utils::path::split_stem;

/// Inserted between stem and version.
pub const VERSION_MARKER: &str = "v";
/// Inserted before the extension of packed artifacts.
pub const PACKED_SUFFIX: &str = "pack";
/// Inserted before the extension of combined artifacts.
pub const COMBINED_SUFFIX: &str = "comb";
/// Joins `<basename><version>` members of a combined artifact.
pub const COMBINED_JOIN: &str = "_";

/// Regex class matching any valid version label.
const VERSION_CLASS: &str = "[A-Za-z0-9-]+";

/// Check a version label.
///
/// Labels are opaque, but they end up inside filenames and inside the patterns
/// that find stale files, so they are limited to ASCII letters, digits and `-`.
/// A `.` would make `menu.v1.pack.js` ambiguous; a `_` would collide with the
/// combined-artifact separator.
pub fn is_valid_version(version: &str) -> bool {
    !version.is_empty()
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Final artifact filename for a unit stem.
pub fn artifact_name(stem: &str, version: &str, flags: ProcessFlags, kind: AssetKind) -> String {
    let mut name = String::with_capacity(stem.len() + version.len() + 12);
    name.push_str(stem);
    if flags.versioned {
        name.push('.');
        name.push_str(VERSION_MARKER);
        name.push_str(version);
    }
    if flags.packed {
        name.push('.');
        name.push_str(PACKED_SUFFIX);
    }
    name.push('.');
    name.push_str(kind.extension());
    name
}

/// `menu.js` → `menu.v<version>.js`.
pub fn versioned_name(file_name: &str, version: &str, kind: AssetKind) -> String {
    let (stem, _) = split_stem(file_name);
    artifact_name(
        stem,
        version,
        ProcessFlags {
            versioned: true,
            ..ProcessFlags::NONE
        },
        kind,
    )
}

/// `menu.v2.js` → `menu.v2.pack.js`.
pub fn packed_name(file_name: &str, kind: AssetKind) -> String {
    let (stem, _) = split_stem(file_name);
    format!("{stem}.{PACKED_SUFFIX}.{}", kind.extension())
}

/// Combined artifact filename for ordered `(basename, version)` members.
///
/// # Example
/// ```ignore
/// let name = combined_name(&[("x", "1"), ("y", "1")], AssetKind::Script);
/// assert_eq!(name, "x1_y1.comb.js");
/// ```
pub fn combined_name(members: &[(&str, &str)], kind: AssetKind) -> String {
    let joined = members
        .iter()
        .map(|(basename, version)| format!("{basename}{version}"))
        .collect::<Vec<_>>()
        .join(COMBINED_JOIN);
    format!("{joined}.{COMBINED_SUFFIX}.{}", kind.extension())
}

// ============================================================================
// Stale patterns
// ============================================================================

/// Recognizes every version of one artifact by filename.
///
/// A regex anchored on both ends plus a list of suffixes the name must not end
/// with. Matching is done on bare filenames; the collector scopes it to one
/// directory.
#[derive(Debug, Clone)]
pub struct StalePattern {
    regex: Regex,
    excluded: Vec<String>,
}

impl StalePattern {
    fn new(source: &str, excluded: Vec<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(source)?,
            excluded,
        })
    }

    /// Check a bare filename.
    pub fn matches(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name) && !self.excluded.iter().any(|s| file_name.ends_with(s))
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Pattern matching `artifact_name(stem, v, flags, kind)` for any valid `v`.
///
/// Returns `Ok(None)` for unversioned units: without a version in the name
/// there is no earlier artifact to recognize.
///
/// Per-file patterns never match combined artifacts, and an unpacked unit's
/// pattern never matches the packed artifacts of the same stem.
pub fn artifact_pattern(
    stem: &str,
    flags: ProcessFlags,
    kind: AssetKind,
) -> Result<Option<StalePattern>, regex::Error> {
    if !flags.versioned {
        return Ok(None);
    }

    let ext = kind.extension();
    let packed = if flags.packed {
        format!(r"\.{PACKED_SUFFIX}")
    } else {
        String::new()
    };
    let source = format!(
        r"^{}\.{VERSION_MARKER}{VERSION_CLASS}{packed}\.{}$",
        regex::escape(stem),
        regex::escape(ext),
    );

    let mut excluded = vec![format!(".{COMBINED_SUFFIX}.{ext}")];
    if !flags.packed {
        excluded.push(format!(".{PACKED_SUFFIX}.{ext}"));
    }
    StalePattern::new(&source, excluded).map(Some)
}

/// Pattern matching `combined_name` for the same ordered basenames and any versions.
pub fn combined_pattern(basenames: &[&str], kind: AssetKind) -> Result<StalePattern, regex::Error> {
    let members = basenames
        .iter()
        .map(|basename| format!("{}{VERSION_CLASS}", regex::escape(basename)))
        .collect::<Vec<_>>()
        .join(COMBINED_JOIN);
    let source = format!(
        r"^{members}\.{COMBINED_SUFFIX}\.{}$",
        regex::escape(kind.extension())
    );
    StalePattern::new(&source, Vec::new())
}
