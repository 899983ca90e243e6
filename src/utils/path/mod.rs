//! Path utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `resolve_path`)
//! - [`route`]: Relative-path helpers (`to_slash`, `flatten_separators`, `split_stem`)

pub mod fs;
pub mod route;

pub use fs::{normalize_path, resolve_path};
pub use route::{flatten_separators, split_stem, to_slash};
