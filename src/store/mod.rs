//! Store Contract
//!
//! The narrow slice of the content-addressed store that string context needs:
//! path syntax, validity, and realisation of paths named by reconstructed
//! context.

pub mod memory;
pub mod path;
pub mod persistence;

pub use memory::MemoryStore;
pub use path::{is_derivation, StoreDir, StorePath};
pub use persistence::SledStore;

use crate::error::StoreError;

/// Store interface
///
/// Path syntax helpers are provided in terms of [`Store::store_dir`];
/// implementations only supply validity and realisation.
pub trait Store {
    fn store_dir(&self) -> &StoreDir;

    /// Whether the path's content is present in the store
    fn is_valid_path(&self, path: &StorePath) -> Result<bool, StoreError>;

    /// Make sure the path's content is present, building or fetching it if needed.
    ///
    /// Idempotent: ensuring an already valid path does nothing.
    fn ensure_path(&self, path: &StorePath) -> Result<(), StoreError>;

    fn parse_store_path(&self, s: &str) -> Result<StorePath, StoreError> {
        self.store_dir().parse_path(s)
    }

    fn is_store_path(&self, s: &str) -> bool {
        self.store_dir().is_store_path(s)
    }

    fn print_store_path(&self, path: &StorePath) -> String {
        self.store_dir().print_path(path)
    }
}
