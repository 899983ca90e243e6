//! Errors raised while building or rendering asset units.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::transform::TransformError;

/// Error from unit construction, `render()` or `combine()`.
///
/// Nothing is retried; the failing group produces no markup.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("source file `{}` not found", .0.display())]
    SourceNotFound(PathBuf, #[source] io::Error),

    #[error("failed to write `{}`", .0.display())]
    WriteFailure(PathBuf, #[source] io::Error),

    #[error("failed to transform `{}`", .0.display())]
    Transform(PathBuf, #[source] TransformError),

    #[error("unknown group `{0}`")]
    UnknownGroup(String),

    #[error("invalid version `{version}` for `{}` (allowed: letters, digits, `-`)", .path.display())]
    InvalidVersion { path: PathBuf, version: String },

    #[error("invalid mode {mode} for `{}` (allowed: 0 to 7)", .path.display())]
    InvalidMode { path: PathBuf, mode: u8 },

    #[error("cannot infer asset kind of `{}` (expected .js or .css)", .0.display())]
    UnknownKind(PathBuf),
}

impl AssetError {
    /// Map an I/O error on a read to `SourceNotFound`.
    pub(crate) fn read(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |err| Self::SourceNotFound(path, err)
    }

    /// Map an I/O error on a write to `WriteFailure`.
    pub(crate) fn write(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |err| Self::WriteFailure(path, err)
    }
}
