//! Asset kind definitions.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Kind of static asset.
///
/// The kind decides the file extension, the reference tag, and which minifier
/// the default transformer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// JavaScript, referenced with `<script>`.
    Script,
    /// CSS, referenced with `<link rel="stylesheet">`.
    Style,
}

impl AssetKind {
    /// File extension without the leading dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Script => "js",
            Self::Style => "css",
        }
    }

    /// Separator placed between members of a combined artifact.
    ///
    /// Scripts get a `;` so a member without a trailing semicolon cannot merge
    /// into the next one.
    pub const fn separator(self) -> &'static str {
        match self {
            Self::Script => ";\n",
            Self::Style => "\n",
        }
    }

    /// Infer the kind from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("js") {
            Some(Self::Script)
        } else if ext.eq_ignore_ascii_case("css") {
            Some(Self::Style)
        } else {
            None
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Style => "style",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(AssetKind::from_path(Path::new("a/b.js")), Some(AssetKind::Script));
        assert_eq!(AssetKind::from_path(Path::new("site.CSS")), Some(AssetKind::Style));
        assert_eq!(AssetKind::from_path(Path::new("logo.png")), None);
        assert_eq!(AssetKind::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_extension() {
        assert_eq!(AssetKind::Script.extension(), "js");
        assert_eq!(AssetKind::Style.extension(), "css");
    }
}
