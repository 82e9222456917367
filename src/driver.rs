//! Pluggable storage drivers.
//!
//! Implement [`StorageDriver`] to keep collections somewhere other than the
//! local file system. The store only ever reads whole documents and writes
//! whole documents, so a driver is little more than a named blob map.

use crate::error::Result;
use crate::persist::atomic_write;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Backing storage for a [`DocumentStore`](crate::DocumentStore).
///
/// Errors returned here never reach store callers; the store logs them and
/// falls back to defaults or to [`write_direct`](Self::write_direct).
pub trait StorageDriver: Send + Sync {
    /// Raw bytes of the named document, or `None` if it does not exist.
    fn read(&self, name: &str) -> io::Result<Option<Vec<u8>>>;

    /// Replace the named document so that readers see either the old or the
    /// new bytes, never a mix.
    fn write_atomic(&self, name: &str, bytes: &[u8]) -> io::Result<()>;

    /// Best-effort replacement used when the atomic path fails. The default
    /// just retries the atomic write; override when a cheaper, less careful
    /// write exists.
    fn write_direct(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        self.write_atomic(name, bytes)
    }

    /// Human-readable location of a document, for log lines.
    fn describe(&self, name: &str) -> String {
        name.to_string()
    }
}

// ---- File system -------------------------------------------------------------

/// Stores each collection as `<root>/<name>`.
#[derive(Debug, Clone)]
pub struct FsDriver {
    root: PathBuf,
}

impl FsDriver {
    /// Use `root` as the data directory, creating it if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of the named document.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl StorageDriver for FsDriver {
    fn read(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        match std::fs::read(self.path_of(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_atomic(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        atomic_write(&self.path_of(name), bytes)
    }

    fn write_direct(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        std::fs::write(self.path_of(name), bytes)
    }

    fn describe(&self, name: &str) -> String {
        self.path_of(name).display().to_string()
    }
}

// ---- RwLock<HashMap> ---------------------------------------------------------

impl StorageDriver for parking_lot::RwLock<HashMap<String, Vec<u8>>> {
    fn read(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(parking_lot::RwLock::read(self).get(name).cloned())
    }

    fn write_atomic(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        self.write().insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}

// ---- ShardMap ----------------------------------------------------------------

impl StorageDriver for shardmap::ShardMap<String, Vec<u8>> {
    fn read(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        let key = name.to_string();
        Ok(shardmap::ShardMap::get(self, &key).map(|arc| (*arc).clone()))
    }

    // A single insert swaps the whole blob, so readers never see a partial one.
    fn write_atomic(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        shardmap::ShardMap::insert(self, name.to_string(), bytes.to_vec());
        Ok(())
    }
}

// ---- DashMap (feature-gated) -------------------------------------------------

#[cfg(feature = "dashmap")]
impl StorageDriver for dashmap::DashMap<String, Vec<u8>> {
    fn read(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(dashmap::DashMap::get(self, name).map(|r| r.value().clone()))
    }

    fn write_atomic(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        dashmap::DashMap::insert(self, name.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// In-memory driver, handy for tests and embedding.
pub type MemoryDriver = parking_lot::RwLock<HashMap<String, Vec<u8>>>;
