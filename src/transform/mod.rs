//! Byte-level transforms applied to packed and combined artifacts.
//!
//! The pipeline only decides *when* to transform; *what* happens to the bytes
//! is up to a [`Transformer`]. [`Minifier`] is the default, [`Passthrough`]
//! copies bytes verbatim. Any `Fn(&[u8], AssetKind, &TransformOptions)` closure
//! works as well.

pub mod import;
pub mod minify;

use std::path::PathBuf;
use std::str::Utf8Error;

use thiserror::Error;

use crate::asset::AssetKind;

pub use minify::Minifier;

/// Context for one transform call.
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    /// Source file the bytes were read from.
    pub origin: PathBuf,
    /// Source root of the asset kind; stylesheet imports resolve against it first.
    pub import_root: PathBuf,
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("input is not valid UTF-8")]
    Encoding(#[from] Utf8Error),

    #[error("script error: {0}")]
    Script(String),

    #[error("stylesheet error: {0}")]
    Style(String),
}

/// Turns source bytes into artifact bytes.
pub trait Transformer: Send + Sync {
    fn transform(
        &self,
        input: &[u8],
        kind: AssetKind,
        options: &TransformOptions,
    ) -> Result<Vec<u8>, TransformError>;
}

impl<F> Transformer for F
where
    F: Fn(&[u8], AssetKind, &TransformOptions) -> Result<Vec<u8>, TransformError> + Send + Sync,
{
    fn transform(
        &self,
        input: &[u8],
        kind: AssetKind,
        options: &TransformOptions,
    ) -> Result<Vec<u8>, TransformError> {
        self(input, kind, options)
    }
}

/// Returns the input unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl Transformer for Passthrough {
    fn transform(
        &self,
        input: &[u8],
        _kind: AssetKind,
        _options: &TransformOptions,
    ) -> Result<Vec<u8>, TransformError> {
        Ok(input.to_vec())
    }
}

/// Select the transformer for the `minify` setting.
pub fn default_transformer(minify: bool) -> Box<dyn Transformer> {
    if minify {
        Box::new(Minifier)
    } else {
        Box::new(Passthrough)
    }
}

fn decode(input: &[u8]) -> Result<&str, TransformError> {
    Ok(std::str::from_utf8(input)?)
}
