//! CLI route: single route table and run context.

use crate::cli::parse::{Commands, StoreCommands};
use crate::cli::presentation::{
    format_info_json, format_info_table, format_store_list_json, format_store_list_text,
    format_string_json,
};
use crate::config::{ConfigLoader, StrctxConfig};
use crate::context::{append_context_info, Context, ContextElement, ContextInfoMap, ContextualString};
use crate::error::ApiError;
use crate::eval::{EvalSettings, EvalState};
use crate::primops;
use crate::store::{MemoryStore, SledStore, Store, StoreDir};
use crate::types::Pos;
use crate::value::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Runtime context for CLI execution: evaluation state and the optional store index
pub struct RunContext {
    state: EvalState,
    index: Option<Arc<SledStore>>,
}

impl RunContext {
    /// Load configuration and open the store it names
    pub fn new(
        project: &Path,
        config_path: Option<&Path>,
        store_db: Option<PathBuf>,
    ) -> Result<Self, ApiError> {
        let mut config = match config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(project)?,
        };
        if store_db.is_some() {
            config.store.db_path = store_db;
        }
        Self::from_config(&config)
    }

    pub fn from_config(config: &StrctxConfig) -> Result<Self, ApiError> {
        let dir = config.store.store_dir()?;
        match &config.store.db_path {
            Some(db_path) => {
                info!(db = %db_path.display(), "opening store index");
                let index = Arc::new(SledStore::open(db_path, dir)?);
                let store: Arc<dyn Store> = index.clone();
                Ok(RunContext {
                    state: EvalState::new(store, config.eval),
                    index: Some(index),
                })
            }
            None => {
                debug!("no store index configured, using an empty in-memory store");
                Ok(RunContext {
                    state: EvalState::new(Arc::new(MemoryStore::with_store_dir(dir)), config.eval),
                    index: None,
                })
            }
        }
    }

    pub fn state(&self) -> &EvalState {
        &self.state
    }

    /// Execute a command, returning its printable output
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let pos = Pos::none();
        let dir = self.state.store_dir();
        match command {
            Commands::Get { format, elements } => {
                let s = self.contextual("", elements)?;
                let info = primops::get_context(&self.state, &pos, &Value::Str(s))?;
                match format.as_str() {
                    "json" => format_info_json(&info),
                    "table" => Ok(format_info_table(&info)),
                    other => Err(ApiError::InvalidInput(format!(
                        "Unknown format '{}' (expected json or table)",
                        other
                    ))),
                }
            }
            Commands::Has { elements } => {
                let s = self.contextual("", elements)?;
                Ok(primops::has_context(&self.state, &pos, &Value::Str(s))?.to_string())
            }
            Commands::Discard { text, elements } => {
                let s = self.contextual(text, elements)?;
                let out = primops::unsafe_discard_string_context(&self.state, &pos, &Value::Str(s))?;
                format_string_json(dir, &out)
            }
            Commands::DiscardOutputs { text, elements } => {
                let s = self.contextual(text, elements)?;
                let out =
                    primops::unsafe_discard_output_dependency(&self.state, &pos, &Value::Str(s))?;
                format_string_json(dir, &out)
            }
            Commands::Append {
                info,
                read_only,
                text,
                elements,
            } => {
                let s = self.contextual(text, elements)?;
                let record: ContextInfoMap = serde_json::from_str(&read_input(info)?)?;
                let state = if *read_only {
                    self.state.with_settings(EvalSettings::read_only())
                } else {
                    self.state.clone()
                };
                let out =
                    append_context_info(state.store(), state.settings(), &pos, &s, &record)?;
                format_string_json(dir, &out)
            }
            Commands::Store { command } => self.execute_store(command),
        }
    }

    fn execute_store(&self, command: &StoreCommands) -> Result<String, ApiError> {
        let index = self.index.as_ref().ok_or_else(|| {
            ApiError::ConfigError(
                "No store index configured (set store.db_path or pass --store-db)".to_string(),
            )
        })?;
        let dir = self.state.store_dir();
        match command {
            StoreCommands::Register { path, deriver } => {
                let path = dir.parse_path(path)?;
                let deriver = deriver.as_deref().map(|d| dir.parse_path(d)).transpose()?;
                index.register_valid_path(&path, deriver.as_ref())?;
                index.flush()?;
                Ok(format!("Registered {}", dir.print_path(&path)))
            }
            StoreCommands::List { format } => {
                let records = index.list_valid_paths()?;
                match format.as_str() {
                    "json" => format_store_list_json(dir, &records),
                    "text" => Ok(format_store_list_text(dir, &records)),
                    other => Err(ApiError::InvalidInput(format!(
                        "Unknown format '{}' (expected text or json)",
                        other
                    ))),
                }
            }
        }
    }

    fn contextual(&self, text: &str, elements: &[String]) -> Result<ContextualString, ApiError> {
        let context = parse_elements(self.state.store_dir(), elements)?;
        Ok(ContextualString::with_context(text, context))
    }
}

/// Parse compact context elements
pub fn parse_elements(dir: &StoreDir, elements: &[String]) -> Result<Context, ApiError> {
    elements
        .iter()
        .map(|e| ContextElement::parse(dir, e).map_err(ApiError::from))
        .collect()
}

fn read_input(source: &str) -> Result<String, ApiError> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(source)?)
    }
}
