//! Configuration System
//!
//! Layered configuration for the store, evaluation settings and logging.
//! Sources are merged by [`ConfigLoader`]: defaults, then the global file,
//! then the project file, then `STRCTX_*` environment variables.

use crate::error::{ApiError, StoreError};
use crate::eval::EvalSettings;
use crate::logging::LoggingConfig;
use crate::store::StoreDir;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrctxConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub eval: EvalSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Store location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory store paths are printed under
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Local path index; an in-memory store is used when unset
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

fn default_store_dir() -> String {
    "/nix/store".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            db_path: None,
        }
    }
}

impl StoreConfig {
    pub fn store_dir(&self) -> Result<StoreDir, StoreError> {
        StoreDir::new(self.store_dir.clone())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.store_dir.is_empty() {
            return Err("Store directory cannot be empty".to_string());
        }
        self.store_dir()
            .map_err(|_| format!("Invalid store directory '{}'", self.store_dir))?;
        if let Some(db_path) = &self.db_path {
            if db_path.as_os_str().is_empty() {
                return Err("Database path cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Store(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Store(msg) => write!(f, "Store: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl StrctxConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.store.validate() {
            errors.push(ValidationError::Store(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding every problem into one error
    pub fn validated(self) -> Result<Self, ApiError> {
        self.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                msgs.join("\n")
            ))
        })?;
        Ok(self)
    }
}
