//! Config field paths for diagnostics.

use std::borrow::Cow;
use std::fmt;

use owo_colors::OwoColorize;

/// Dotted path of a config field, e.g. `pipeline.cache` or `assets[2].version`.
///
/// Static paths come from `#[derive(Config)]`:
///
/// ```ignore
/// #[derive(Config)]
/// #[config(section = "pipeline")]
/// pub struct PipelineConfig {
///     pub minify: bool,
/// }
///
/// diag.error(PipelineConfig::FIELDS.minify, "...");
/// ```
///
/// Paths into array entries are built at runtime with [`FieldPath::entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(Cow<'static, str>);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(Cow::Borrowed(path))
    }

    /// `assets[3].version`
    pub fn entry(array: &str, index: usize, field: &str) -> Self {
        Self(Cow::Owned(format!("{array}[{index}].{field}")))
    }

    /// `scripts.source.dir`
    pub fn join(&self, field: &str) -> Self {
        Self(Cow::Owned(format!("{}.{field}", self.0)))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
