//! Config loader: merges every source in precedence order.

use super::merge::merge_policy;
use super::sources::{env, global_file, project_file};
use super::StrctxConfig;
use crate::error::ApiError;
use config::File;
use std::path::Path;
use tracing::debug;

/// Loads [`StrctxConfig`] from layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a project directory.
    ///
    /// Precedence (lowest to highest): defaults, global file, project
    /// `strctx.toml`, `STRCTX_*` environment variables.
    pub fn load(project_root: &Path) -> Result<StrctxConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = project_file::add_to_builder(builder, project_root)?;
        let builder = env::add_to_builder(builder);

        let config: StrctxConfig = builder.build()?.try_deserialize()?;
        debug!(project_root = %project_root.display(), "configuration loaded");
        config.validated()
    }

    /// Load from one explicit file; only environment variables override it
    pub fn load_from_file(path: &Path) -> Result<StrctxConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true));
        let builder = env::add_to_builder(builder);

        let config: StrctxConfig = builder.build()?.try_deserialize()?;
        config.validated()
    }
}
