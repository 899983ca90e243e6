//! Content hashing using blake3.
//!
//! Digests of an artifact's sources are stored next to the artifact as
//! `<artifact>.b3` (hex) when content verification is enabled.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::utils::fs::atomic_write;

/// Suffix appended to an artifact's filename to locate its digest.
pub const DIGEST_SUFFIX: &str = ".b3";

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s.trim()).ok()?;
        let arr: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(arr))
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First 16 hex chars are enough to tell digests apart in logs
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Hash one file, streaming.
pub fn compute_file_hash(path: &Path) -> io::Result<ContentHash> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(64 * 1024, file);
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                hasher.update(&buffer[..n]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(ContentHash::new(*hasher.finalize().as_bytes()))
}

/// Combined hash of several files, order-sensitive.
pub fn compute_sources_hash(sources: &[PathBuf]) -> io::Result<ContentHash> {
    let mut hasher = blake3::Hasher::new();
    for source in sources {
        hasher.update(compute_file_hash(source)?.as_bytes());
    }
    Ok(ContentHash::new(*hasher.finalize().as_bytes()))
}

/// `dir/app.v1.pack.js` → `dir/app.v1.pack.js.b3`.
pub fn digest_path(artifact: &Path) -> PathBuf {
    let mut name = artifact.as_os_str().to_os_string();
    name.push(DIGEST_SUFFIX);
    PathBuf::from(name)
}

/// Digest stored for `artifact`, if any.
pub fn read_digest(artifact: &Path) -> Option<ContentHash> {
    let text = fs::read_to_string(digest_path(artifact)).ok()?;
    ContentHash::from_hex(&text)
}

/// Store `hash` as the digest of `artifact`.
pub fn write_digest(artifact: &Path, hash: ContentHash) -> io::Result<()> {
    atomic_write(&digest_path(artifact), hash.to_hex().as_bytes())
}
