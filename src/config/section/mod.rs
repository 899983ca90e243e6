//! `vanish.toml` section definitions.

mod assets;
mod pipeline;
mod roots;

pub use assets::{AssetEntry, ModeSetting};
pub use pipeline::PipelineConfig;
pub use roots::{KindConfig, RootEntry};
