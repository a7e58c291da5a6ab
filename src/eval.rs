//! Evaluation state shared by the primitive operations

use crate::store::{Store, StoreDir};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Execution configuration consulted by the primitive operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalSettings {
    /// Never touch the store: reconstructed context is not realised
    #[serde(default)]
    pub read_only_mode: bool,
}

impl EvalSettings {
    pub fn read_only() -> Self {
        EvalSettings {
            read_only_mode: true,
        }
    }
}

/// Store handle plus settings, passed explicitly to every operation
#[derive(Clone)]
pub struct EvalState {
    store: Arc<dyn Store>,
    settings: EvalSettings,
}

impl EvalState {
    pub fn new(store: Arc<dyn Store>, settings: EvalSettings) -> Self {
        EvalState { store, settings }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn store_dir(&self) -> &StoreDir {
        self.store.store_dir()
    }

    pub fn settings(&self) -> &EvalSettings {
        &self.settings
    }

    /// Same store, different settings
    pub fn with_settings(&self, settings: EvalSettings) -> EvalState {
        EvalState {
            store: Arc::clone(&self.store),
            settings,
        }
    }
}

impl fmt::Debug for EvalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalState")
            .field("store_dir", self.store_dir())
            .field("settings", &self.settings)
            .finish()
    }
}
