//! Asset units, artifact naming, and the cache lifecycle.
//!
//! - [`AssetUnit`]: one source file, rendered into a versioned artifact
//! - [`combine()`]: merges a group's units into one artifact per kind
//! - [`name`]: deterministic filenames and stale-file patterns
//! - [`StaleCollector`]: removes artifacts superseded by a new version

mod collect;
mod combine;
mod error;
mod flags;
mod kind;
mod location;
mod markup;
pub mod name;
mod registry;
mod unit;

// Types
pub use error::AssetError;
pub use flags::ProcessFlags;
pub use kind::AssetKind;
pub use location::{Anchor, AssetRoots, KindRoots, Location, Root};
pub use markup::{Attrs, tag};
pub use registry::{EmittedArtifacts, RenderedRegistry};
pub use unit::{AssetUnit, RenderContext};

// Lifecycle
pub use collect::{DirectoryScan, StaleCollector};
pub use combine::combine;
