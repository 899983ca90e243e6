//! `[pipeline]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [pipeline]
//! debug = false       # Reference unaltered sources, generate nothing
//! minify = true       # false: packed artifacts are verbatim copies
//! cache = "exists"    # "exists" | "content"
//! ```

use macros::Config;
use serde::{Deserialize, Serialize};

use crate::freshness::CachePolicy;

/// Rendering behavior shared by every asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Config)]
#[serde(default)]
#[config(section = "pipeline")]
pub struct PipelineConfig {
    /// Reference the unaltered source files instead of generated artifacts.
    pub debug: bool,

    /// Minify scripts (oxc) and stylesheets (lightningcss) when packing.
    #[config(inline_doc = "false: packed artifacts are verbatim copies")]
    pub minify: bool,

    /// How an existing artifact is validated before reuse.
    /// - `exists` (default): a file under the computed name is trusted
    /// - `content`: a blake3 digest of its sources must also match
    pub cache: CachePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            debug: false,
            minify: true,
            cache: CachePolicy::Exists,
        }
    }
}
