//! Reconstruction against the persistent store index

use string_context::context::{append_context_info, ContextInfoMap, ContextualString, PathInfo};
use string_context::error::{ContextError, StoreError};
use string_context::eval::EvalSettings;
use string_context::store::{SledStore, Store, StoreDir, StorePath};
use string_context::types::Pos;
use tempfile::TempDir;

#[test]
fn test_registered_paths_can_be_appended() {
    let temp_dir = TempDir::new().unwrap();
    let store = SledStore::open(temp_dir.path(), StoreDir::default()).unwrap();
    let drv = StorePath::from_content("tool.drv", b"tool").unwrap();
    let missing = StorePath::from_content("gone", b"gone").unwrap();
    store.register_valid_path(&drv, None).unwrap();

    let record: ContextInfoMap = [(
        store.print_store_path(&drv),
        PathInfo {
            all_outputs: true,
            ..Default::default()
        },
    )]
    .into_iter()
    .collect();
    let result = append_context_info(
        &store,
        &EvalSettings::default(),
        &Pos::none(),
        &ContextualString::plain(""),
        &record,
    )
    .unwrap();
    assert_eq!(result.context().len(), 1);

    let record: ContextInfoMap = [(
        store.print_store_path(&missing),
        PathInfo {
            path: true,
            ..Default::default()
        },
    )]
    .into_iter()
    .collect();
    let err = append_context_info(
        &store,
        &EvalSettings::default(),
        &Pos::none(),
        &ContextualString::plain(""),
        &record,
    )
    .unwrap_err();
    assert!(matches!(err, ContextError::Store(StoreError::CannotRealise(_))));

    // read-only mode does not consult the index
    assert!(append_context_info(
        &store,
        &EvalSettings::read_only(),
        &Pos::none(),
        &ContextualString::plain(""),
        &record,
    )
    .is_ok());
}

#[test]
fn test_custom_store_dir() {
    let temp_dir = TempDir::new().unwrap();
    let dir = StoreDir::new("/gnu/store").unwrap();
    let store = SledStore::open(temp_dir.path(), dir).unwrap();
    let path = StorePath::from_content("guile", b"g").unwrap();
    let printed = store.print_store_path(&path);
    assert!(printed.starts_with("/gnu/store/"));
    assert_eq!(store.parse_store_path(&printed).unwrap(), path);
    assert!(!store.is_store_path(&format!("/nix/store/{}", path.base_name())));
}
