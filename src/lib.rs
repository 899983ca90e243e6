//! vanish - build-time versioning, combination and cache lifecycle for
//! scripts and stylesheets.
//!
//! ```ignore
//! let mut pipeline = Pipeline::new(AssetRoots::under(Path::new("public")));
//! pipeline.add_unit(AssetUnit::new("init.js", "1-0-0")?, "main");
//! pipeline.add_unit(AssetUnit::new("site.css", "4")?, "main");
//!
//! let rendered = pipeline.render("main")?;
//! print!("{}", rendered.get("main").unwrap_or_default());
//! ```

pub mod asset;
pub mod cli;
pub mod config;
pub mod freshness;
pub mod logger;
pub mod pipeline;
pub mod transform;
pub mod utils;

pub use asset::{AssetError, AssetKind, AssetRoots, AssetUnit, KindRoots, ProcessFlags, Root};
pub use config::VanishConfig;
pub use freshness::CachePolicy;
pub use pipeline::{Pipeline, RenderTarget, Rendered};
pub use transform::{Passthrough, TransformError, TransformOptions, Transformer};
