//! Project configuration management for `vanish.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── assets     # [[assets]]
//! │   ├── pipeline   # [pipeline]
//! │   └── roots      # [scripts] and [styles]
//! ├── types/         # FieldPath, ConfigError, ConfigDiagnostics
//! ├── util.rs        # Config file discovery
//! └── mod.rs         # VanishConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section      | Purpose                                          |
//! |--------------|--------------------------------------------------|
//! | `[pipeline]` | Debug mode, minification, cache validation       |
//! | `[scripts]`  | Script source and cache roots                    |
//! | `[styles]`   | Stylesheet source and cache roots                |
//! | `[[assets]]` | One entry per source file: version, group, mode  |

pub mod section;
pub mod types;
mod util;

pub use section::{AssetEntry, KindConfig, ModeSetting, PipelineConfig, RootEntry};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};
pub use util::find_config_file;

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::asset::{AssetError, AssetRoots};
use crate::log;
use crate::pipeline::Pipeline;
use crate::transform::default_transformer;
use crate::utils::path::normalize_path;

/// Default config filename.
pub const CONFIG_FILE: &str = "vanish.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing vanish.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VanishConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default = "KindConfig::scripts")]
    pub scripts: KindConfig,

    #[serde(default = "KindConfig::styles")]
    pub styles: KindConfig,

    #[serde(default)]
    pub assets: Vec<AssetEntry>,
}

impl Default for VanishConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            pipeline: PipelineConfig::default(),
            scripts: KindConfig::scripts(),
            styles: KindConfig::styles(),
            assets: Vec::new(),
        }
    }
}

impl VanishConfig {
    /// Find `config_name` upward from `start` and load it.
    pub fn discover(config_name: &Path, start: &Path) -> Result<Self, ConfigError> {
        let path = find_config_file(config_name, start)
            .ok_or_else(|| ConfigError::NotFound(config_name.to_path_buf()))?;
        Self::from_path(&path)
    }

    /// Load, validate and normalize the config file at `path`.
    ///
    /// Unknown fields are reported as warnings and otherwise ignored.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        // Asset paths must be checked while still relative
        config.validate()?;

        config.config_path = normalize_path(path);
        let root = config
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.normalize_paths(&root);
        Ok(config)
    }

    /// Parse configuration from a TOML string, without validation.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("config"; "unknown fields in {} are ignored:", display_path);
        for field in fields {
            log!("config"; "- {}", field);
        }
    }

    /// Resolve every configured directory against `root`.
    fn normalize_paths(&mut self, root: &Path) {
        self.root = normalize_path(root);
        self.scripts.normalize(&self.root);
        self.styles.normalize(&self.root);
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate the whole configuration, collecting every error at once.
    ///
    /// Warnings are printed; only errors fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        self.scripts.validate(FieldPath::new("scripts"), &mut diag);
        self.styles.validate(FieldPath::new("styles"), &mut diag);
        for (index, entry) in self.assets.iter().enumerate() {
            entry.validate(index, &mut diag);
        }
        if self.assets.is_empty() {
            diag.warn(FieldPath::new("assets"), "no assets configured");
        }

        diag.print_warnings();
        diag.into_result().map_err(ConfigError::Diagnostics)
    }

    // ========================================================================
    // pipeline construction
    // ========================================================================

    pub fn roots(&self) -> AssetRoots {
        AssetRoots::new(self.scripts.roots(), self.styles.roots())
    }

    /// Build a pipeline holding every configured asset in its group.
    pub fn build_pipeline(&self) -> Result<Pipeline, AssetError> {
        let mut pipeline = Pipeline::new(self.roots())
            .with_boxed_transformer(default_transformer(self.pipeline.minify))
            .with_policy(self.pipeline.cache);
        if self.pipeline.debug {
            pipeline.debug_on();
        }

        for entry in &self.assets {
            pipeline.add_unit(entry.to_unit()?, &entry.group);
        }
        Ok(pipeline)
    }

    // ========================================================================
    // template
    // ========================================================================

    /// Commented `vanish.toml` written by `vanish init`.
    pub fn template() -> String {
        let mut out = format!(
            "# vanish configuration file (v{})\n\n",
            env!("CARGO_PKG_VERSION")
        );
        out.push_str(&PipelineConfig::template_with_header());
        out.push('\n');
        out.push_str(ROOTS_TEMPLATE);
        out.push('\n');
        out.push_str(ASSETS_TEMPLATE);
        out
    }
}

const ROOTS_TEMPLATE: &str = r#"# Source directories and the URLs they are served under.
# Artifacts go to <source>/cache unless `cache` is set.
[scripts]
source = { dir = "scripts", url = "/scripts" }
# cache = { dir = "scripts/cache", url = "/scripts/cache" }

[styles]
source = { dir = "styles", url = "/styles" }
"#;

const ASSETS_TEMPLATE: &str = r#"# One entry per source file, relative to its kind's source directory.
# mode: 1 pack, 2 version, 4 relocate; only mode 7 entries are combined.
# [[assets]]
# path = "init.js"
# version = "1-0-0"
# group = "main"
# mode = 7
# combine = true
# attrs = { defer = "defer" }
"#;

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config without validation.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> VanishConfig {
    let (parsed, ignored) = VanishConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
