//! Project config file source: strctx.toml in the project root

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::Path;
use tracing::warn;

pub const PROJECT_CONFIG_FILE: &str = "strctx.toml";

/// Add the project config file to builder.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    project_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = project_root.join(PROJECT_CONFIG_FILE);
    if path.is_dir() {
        warn!(config_path = %path.display(), "project configuration path is a directory, ignoring");
        return Ok(builder);
    }
    if path.exists() {
        return Ok(builder.add_source(File::from(path.as_path()).required(false)));
    }
    Ok(builder)
}
