//! In-memory store with an observable realisation log

use crate::error::StoreError;
use crate::store::{Store, StoreDir, StorePath};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Store kept entirely in memory.
///
/// Paths are either valid (present) or substitutable (can be realised on
/// demand). Every `ensure_path` call is recorded, whatever its outcome.
#[derive(Debug, Default)]
pub struct MemoryStore {
    dir: StoreDir,
    valid: Mutex<BTreeSet<StorePath>>,
    substitutable: Mutex<BTreeSet<StorePath>>,
    ensure_calls: Mutex<Vec<StorePath>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store_dir(dir: StoreDir) -> Self {
        MemoryStore {
            dir,
            ..Self::default()
        }
    }

    /// Mark a path as present
    pub fn add_valid(&self, path: StorePath) {
        self.valid.lock().insert(path);
    }

    /// Mark a path as realisable on demand
    pub fn add_substitutable(&self, path: StorePath) {
        self.substitutable.lock().insert(path);
    }

    /// Every path passed to `ensure_path`, in call order
    pub fn ensure_calls(&self) -> Vec<StorePath> {
        self.ensure_calls.lock().clone()
    }

    pub fn valid_paths(&self) -> Vec<StorePath> {
        self.valid.lock().iter().cloned().collect()
    }
}

impl Store for MemoryStore {
    fn store_dir(&self) -> &StoreDir {
        &self.dir
    }

    fn is_valid_path(&self, path: &StorePath) -> Result<bool, StoreError> {
        Ok(self.valid.lock().contains(path))
    }

    fn ensure_path(&self, path: &StorePath) -> Result<(), StoreError> {
        self.ensure_calls.lock().push(path.clone());

        if self.valid.lock().contains(path) {
            debug!(path = %path, "path already valid");
            return Ok(());
        }
        if self.substitutable.lock().remove(path) {
            info!(path = %path, "realised path");
            self.valid.lock().insert(path.clone());
            return Ok(());
        }
        Err(StoreError::CannotRealise(self.print_store_path(path)))
    }
}
