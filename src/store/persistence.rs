//! Persistence layer for the local store index

use crate::error::StoreError;
use crate::store::{Store, StoreDir, StorePath};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Metadata kept for each registered path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRecord {
    pub path: StorePath,
    /// Build-step description that produced the path, if known
    pub deriver: Option<StorePath>,
    /// Seconds since the Unix epoch
    pub registered_at: u64,
}

/// Sled-based store index.
///
/// Has no substituters: `ensure_path` succeeds only for registered paths.
pub struct SledStore {
    dir: StoreDir,
    db: sled::Db,
}

fn db_error(context: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::Database(format!("{}: {}", context, e))
}

impl SledStore {
    /// Open (or create) the index at the given path
    pub fn open<P: AsRef<Path>>(path: P, dir: StoreDir) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|e| db_error("Failed to open sled database", e))?;
        Ok(Self { dir, db })
    }

    /// Record a path as present in the store
    pub fn register_valid_path(
        &self,
        path: &StorePath,
        deriver: Option<&StorePath>,
    ) -> Result<(), StoreError> {
        let registered_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let record = PathRecord {
            path: path.clone(),
            deriver: deriver.cloned(),
            registered_at,
        };
        let value = bincode::serialize(&record)
            .map_err(|e| db_error("Failed to serialize path record", e))?;
        self.db
            .insert(path.base_name().as_bytes(), value)
            .map_err(|e| db_error("Failed to put path record", e))?;
        debug!(path = %path, "registered valid path");
        Ok(())
    }

    pub fn query_path_info(&self, path: &StorePath) -> Result<Option<PathRecord>, StoreError> {
        match self
            .db
            .get(path.base_name().as_bytes())
            .map_err(|e| db_error("Failed to get path record", e))?
        {
            Some(value) => {
                let record: PathRecord = bincode::deserialize(&value)
                    .map_err(|e| db_error("Failed to deserialize path record", e))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// All registered paths, ordered by base name
    pub fn list_valid_paths(&self) -> Result<Vec<PathRecord>, StoreError> {
        let mut records = Vec::new();
        for item in self.db.iter() {
            let (_, value) = item.map_err(|e| db_error("Failed to iterate store", e))?;
            let record: PathRecord = bincode::deserialize(&value)
                .map_err(|e| db_error("Failed to deserialize path record", e))?;
            records.push(record);
        }
        Ok(records)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db
            .flush()
            .map_err(|e| db_error("Failed to flush store", e))?;
        Ok(())
    }
}

impl Store for SledStore {
    fn store_dir(&self) -> &StoreDir {
        &self.dir
    }

    fn is_valid_path(&self, path: &StorePath) -> Result<bool, StoreError> {
        self.db
            .contains_key(path.base_name().as_bytes())
            .map_err(|e| db_error("Failed to query path", e))
    }

    fn ensure_path(&self, path: &StorePath) -> Result<(), StoreError> {
        if self.is_valid_path(path)? {
            return Ok(());
        }
        Err(StoreError::CannotRealise(self.print_store_path(path)))
    }
}
