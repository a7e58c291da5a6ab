//! Layered configuration loading

use std::path::Path;
use string_context::cli::RunContext;
use string_context::config::ConfigLoader;
use tempfile::TempDir;

#[test]
fn test_project_file_sets_read_only_mode() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("strctx.toml"),
        "[eval]\nread_only_mode = true\n\n[store]\nstore_dir = \"/gnu/store\"\n",
    )
    .unwrap();

    let config = ConfigLoader::load(temp_dir.path()).unwrap();
    assert!(config.eval.read_only_mode);
    assert_eq!(config.store.store_dir, "/gnu/store");

    let ctx = RunContext::new(temp_dir.path(), None, None).unwrap();
    assert!(ctx.state().settings().read_only_mode);
    assert_eq!(ctx.state().store_dir().as_str(), "/gnu/store");
}

#[test]
fn test_invalid_project_config_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("strctx.toml"),
        "[store]\nstore_dir = \"store\"\n",
    )
    .unwrap();
    assert!(ConfigLoader::load(temp_dir.path()).is_err());
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    assert!(ConfigLoader::load_from_file(Path::new("/definitely/missing/strctx.toml")).is_err());
}
