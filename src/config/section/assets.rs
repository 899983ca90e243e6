//! `[[assets]]` entries.
//!
//! # Example
//!
//! ```toml
//! [[assets]]
//! path = "init.js"
//! version = "1-0-0"
//! group = "main"
//! mode = 7                  # or { version = true, relocate = true, pack = true }
//! combine = true
//! attrs = { defer = "defer" }
//! ```

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::asset::name::is_valid_version;
use crate::asset::{AssetError, AssetKind, AssetUnit, Attrs, ProcessFlags};
use crate::config::{ConfigDiagnostics, FieldPath};
use crate::pipeline::DEFAULT_GROUP;

/// Processing steps of an entry, as a bitmask or spelled out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModeSetting {
    /// `1` pack, `2` version, `4` relocate.
    Mode(u8),
    Steps {
        #[serde(default = "enabled")]
        version: bool,
        #[serde(default = "enabled")]
        relocate: bool,
        #[serde(default = "enabled")]
        pack: bool,
    },
}

fn enabled() -> bool {
    true
}

impl Default for ModeSetting {
    fn default() -> Self {
        Self::Mode(ProcessFlags::ALL.mode())
    }
}

impl ModeSetting {
    /// The bitmask as written, in range or not.
    pub fn bits(self) -> u8 {
        match self {
            Self::Mode(mode) => mode,
            Self::Steps {
                version,
                relocate,
                pack,
            } => {
                (pack as u8) * ProcessFlags::PACK
                    | (version as u8) * ProcessFlags::VERSION
                    | (relocate as u8) * ProcessFlags::MOVE
            }
        }
    }

    /// `None` for a bitmask above 7.
    pub fn flags(self) -> Option<ProcessFlags> {
        match self {
            Self::Mode(mode) => ProcessFlags::from_mode(mode),
            Self::Steps {
                version,
                relocate,
                pack,
            } => Some(ProcessFlags {
                versioned: version,
                relocated: relocate,
                packed: pack,
            }),
        }
    }
}

/// One source file, relative to its kind's source root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub path: PathBuf,

    pub version: String,

    /// Overrides the kind inferred from the extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<AssetKind>,

    #[serde(default = "default_group")]
    pub group: String,

    #[serde(default)]
    pub mode: ModeSetting,

    #[serde(default = "enabled")]
    pub combine: bool,

    /// Extra tag attributes, kept in file order.
    #[serde(
        default,
        deserialize_with = "ordered_attrs",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub attrs: Attrs,
}

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}

impl AssetEntry {
    pub fn new(path: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
            kind: None,
            group: default_group(),
            mode: ModeSetting::default(),
            combine: true,
            attrs: Vec::new(),
        }
    }

    pub fn kind(&self) -> Option<AssetKind> {
        self.kind.or_else(|| AssetKind::from_path(&self.path))
    }

    /// Build the unit this entry describes.
    pub fn to_unit(&self) -> Result<AssetUnit, AssetError> {
        let kind = self
            .kind()
            .ok_or_else(|| AssetError::UnknownKind(self.path.clone()))?;
        let flags = self.mode.flags().ok_or_else(|| AssetError::InvalidMode {
            path: self.path.clone(),
            mode: self.mode.bits(),
        })?;
        let unit = AssetUnit::of_kind(self.path.clone(), self.version.clone(), kind)?
            .with_flags(flags)
            .with_combine(self.combine)
            .with_attrs(self.attrs.clone());
        Ok(unit)
    }

    /// Check entry `index` of the `[[assets]]` array.
    pub fn validate(&self, index: usize, diag: &mut ConfigDiagnostics) {
        let field = |name: &str| FieldPath::entry("assets", index, name);

        if self.path.as_os_str().is_empty() {
            diag.error(field("path"), "path must not be empty");
        } else {
            validate_path_safety(&self.path, field("path"), diag);
            if self.kind().is_none() {
                diag.error_with_hint(
                    field("path"),
                    format!("cannot infer asset kind of `{}`", self.path.display()),
                    "use a .js or .css extension, or set `kind = \"script\"` / `kind = \"style\"`",
                );
            }
        }

        if !is_valid_version(&self.version) {
            diag.error_with_hint(
                field("version"),
                format!("invalid version `{}`", self.version),
                "versions may contain only ASCII letters, digits and `-`",
            );
        }

        match self.mode.flags() {
            None => diag.error(field("mode"), "mode must be between 0 and 7"),
            Some(flags) if self.combine && !flags.is_full() => diag.warn(
                field("combine"),
                "only entries with every step enabled are combined",
            ),
            Some(_) => {}
        }

        if self.group.trim().is_empty() {
            diag.error(field("group"), "group must not be empty");
        }
    }
}

/// Reject `..` components and absolute paths.
fn validate_path_safety(path: &Path, field: FieldPath, diag: &mut ConfigDiagnostics) {
    for comp in path.components() {
        let reason = match comp {
            Component::ParentDir => "parent directory '..' not allowed",
            Component::Prefix(_) | Component::RootDir => "absolute paths not allowed",
            _ => continue,
        };
        diag.error(field.clone(), format!("path '{}': {reason}", path.display()));
        return;
    }
}

fn ordered_attrs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Attrs, D::Error> {
    struct AttrsVisitor;

    impl<'de> Visitor<'de> for AttrsVisitor {
        type Value = Attrs;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a table of attribute names to string values")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Attrs, A::Error> {
            let mut attrs = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, value)) = map.next_entry::<String, String>()? {
                attrs.push((name, value));
            }
            Ok(attrs)
        }
    }

    deserializer.deserialize_map(AttrsVisitor)
}
