//! Cache Store Module
//!
//! Persists artifacts on disk. Writes land in a temp file next to the
//! destination and are renamed into place, so readers only ever see complete
//! files. Writers for the same storage path are serialized on a per-path
//! guard.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::resolve::locator;

// == Public Constants ==
/// Prefix of in-flight temp files inside the cache root
pub const TEMP_FILE_PREFIX: &str = ".imageserver-";

// == Cache Store ==
/// Atomic, per-path guarded artifact writer.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Guards for storage paths with an in-flight writer
    guards: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl CacheStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Exclusive Access ==
    /// Runs `f` while holding the guard for `storage_path`.
    ///
    /// Callers for different paths never block each other. The guard entry is
    /// dropped once no caller holds or waits on it.
    pub fn with_exclusive<T>(&self, storage_path: &Path, f: impl FnOnce() -> T) -> T {
        let guard = {
            let mut guards = self.guards.lock().unwrap_or_else(PoisonError::into_inner);
            guards
                .entry(storage_path.to_path_buf())
                .or_default()
                .clone()
        };

        let result = {
            let _held = guard.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        let mut guards = self.guards.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the table and this caller still reference it
        if Arc::strong_count(&guard) == 2 {
            guards.remove(storage_path);
        }

        result
    }

    // == Read ==
    /// Reads an existing artifact, `None` if there is none.
    pub fn read(&self, storage_path: &Path) -> io::Result<Option<Vec<u8>>> {
        match fs::read(storage_path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    // == Write ==
    /// Atomically replaces the artifact at `storage_path` with `bytes`.
    ///
    /// Parent directories are created as needed.
    pub fn write(&self, storage_path: &Path, bytes: &[u8]) -> io::Result<()> {
        locator::prepare(storage_path)?;

        let dir = match storage_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .tempfile_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(storage_path).map_err(|e| e.error)?;

        debug!("Persisted {} bytes to {}", bytes.len(), storage_path.display());
        Ok(())
    }

    /// Number of storage paths with an in-flight writer.
    pub fn pending(&self) -> usize {
        self.guards
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
