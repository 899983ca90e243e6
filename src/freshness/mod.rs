//! Freshness: deciding whether an existing artifact can be reused.
//!
//! The default policy trusts any artifact that exists under its computed
//! name. The `content` policy additionally requires a blake3 digest of the
//! artifact's sources, stored next to it, to match.

mod hash;

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use hash::{
    ContentHash, DIGEST_SUFFIX, compute_file_hash, compute_sources_hash, digest_path, read_digest,
    write_digest,
};

/// How an existing artifact is validated before reuse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CachePolicy {
    /// Existing file under the computed name is valid.
    #[default]
    Exists,
    /// Existing file is valid only if its recorded source digest matches.
    Content,
}

impl CachePolicy {
    /// Whether intermediate files (relocated copies, versioned copies) may be
    /// reused without being rewritten.
    #[inline]
    pub fn trusts_existing(self) -> bool {
        matches!(self, Self::Exists)
    }

    /// Check whether `artifact` can be reused for `sources`.
    pub fn is_fresh(self, artifact: &Path, sources: &[PathBuf]) -> bool {
        if !artifact.is_file() {
            return false;
        }
        match self {
            Self::Exists => true,
            Self::Content => {
                let Some(stored) = read_digest(artifact) else {
                    return false;
                };
                compute_sources_hash(sources).is_ok_and(|current| current == stored)
            }
        }
    }

    /// Record whatever this policy needs to validate `artifact` next time.
    pub fn record(self, artifact: &Path, sources: &[PathBuf]) -> io::Result<()> {
        match self {
            Self::Exists => Ok(()),
            Self::Content => write_digest(artifact, compute_sources_hash(sources)?),
        }
    }
}
