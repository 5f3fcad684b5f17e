//! Content hashing with blake3.
//!
//! Used to drop watcher events for files whose bytes did not change
//! (touch, save-without-edit).

use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

/// A 256-bit content hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn of(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    /// Hash a file by streaming it.
    pub fn of_file(path: &Path) -> io::Result<Self> {
        let mut hasher = blake3::Hasher::new();
        let mut file = File::open(path)?;
        io::copy(&mut file, &mut hasher)?;
        Ok(Self(*hasher.finalize().as_bytes()))
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex()[..16])
    }
}
