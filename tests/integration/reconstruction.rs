//! appendContext: validation, realisation and all-or-nothing merging

use super::test_utils::Fixture;
use string_context::context::{
    append_context_info, ContextElement, ContextInfoMap, ContextualString, PathInfo,
};
use string_context::error::{ContextError, DrvFacet, StoreError};
use string_context::eval::EvalSettings;
use string_context::primops::{append_context, get_context};
use string_context::store::StorePath;
use string_context::types::Pos;
use string_context::value::Value;

fn path_only() -> PathInfo {
    PathInfo {
        path: true,
        ..Default::default()
    }
}

#[test]
fn test_invalid_key_leaves_context_unchanged() {
    let fx = Fixture::default();
    let original = fx.mixed_string();
    let record: ContextInfoMap = [("not-a-path".to_string(), path_only())]
        .into_iter()
        .collect();

    let pos = Pos::new("build.nix", 12, 5);
    let err = append_context_info(fx.state.store(), fx.state.settings(), &pos, &original, &record)
        .unwrap_err();
    match err {
        ContextError::InvalidContextKey { key, pos } => {
            assert_eq!(key, "not-a-path");
            assert_eq!(pos.line, 12);
        }
        other => panic!("unexpected error: {other}"),
    }

    // observed separately from the failed call
    assert_eq!(original, fx.mixed_string());
    assert_eq!(original.context().len(), 3);
}

#[test]
fn test_all_outputs_on_plain_path_is_not_a_derivation() {
    let fx = Fixture::default();
    let original = ContextualString::plain("x");
    let record: ContextInfoMap = [(
        fx.print(&fx.src),
        PathInfo {
            all_outputs: true,
            ..Default::default()
        },
    )]
    .into_iter()
    .collect();

    let err = append_context_info(
        fx.state.store(),
        fx.state.settings(),
        &Pos::none(),
        &original,
        &record,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ContextError::NotADerivation {
            facet: DrvFacet::AllOutputs,
            ref path,
            ..
        } if *path == fx.print(&fx.src)
    ));
    assert!(!original.has_context());
}

#[test]
fn test_failure_in_later_entry_merges_nothing() {
    let fx = Fixture::default();
    let original = ContextualString::plain("x");
    let mut record = ContextInfoMap::new();
    record.insert(fx.print(&fx.drv), path_only());
    record.insert(
        fx.print(&fx.src),
        PathInfo {
            outputs: vec!["out".to_string()],
            ..Default::default()
        },
    );

    let result = append_context_info(
        fx.state.store(),
        fx.state.settings(),
        &Pos::none(),
        &original,
        &record,
    );
    assert!(matches!(
        result,
        Err(ContextError::NotADerivation {
            facet: DrvFacet::Outputs,
            ..
        })
    ));
    assert!(!original.has_context());
}

#[test]
fn test_read_only_mode_never_touches_store() {
    let fx = Fixture::new(EvalSettings::read_only());
    let missing = StorePath::from_content("never-built", b"?").unwrap();
    let mut record = ContextInfoMap::new();
    record.insert(fx.print(&fx.src), path_only());
    record.insert(fx.print(&missing), path_only());

    let result = append_context_info(
        fx.state.store(),
        fx.state.settings(),
        &Pos::none(),
        &ContextualString::plain(""),
        &record,
    )
    .unwrap();
    assert!(fx.store.ensure_calls().is_empty());
    assert!(result.context().contains(&ContextElement::opaque(missing)));
}

#[test]
fn test_realisation_happens_outside_read_only_mode() {
    let fx = Fixture::default();
    let record: ContextInfoMap = [(fx.print(&fx.out), path_only())].into_iter().collect();

    append_context_info(
        fx.state.store(),
        fx.state.settings(),
        &Pos::none(),
        &ContextualString::plain(""),
        &record,
    )
    .unwrap();
    assert_eq!(fx.store.ensure_calls(), vec![fx.out.clone()]);
    assert!(fx.store.valid_paths().contains(&fx.out));
}

#[test]
fn test_store_failure_is_fatal() {
    let fx = Fixture::default();
    let missing = StorePath::from_content("unobtainable", b"?").unwrap();
    let record: ContextInfoMap = [(fx.print(&missing), path_only())].into_iter().collect();

    let err = append_context_info(
        fx.state.store(),
        fx.state.settings(),
        &Pos::none(),
        &ContextualString::plain(""),
        &record,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ContextError::Store(StoreError::CannotRealise(_))
    ));
}

#[test]
fn test_round_trip_through_introspection() {
    let fx = Fixture::default();
    let s = fx.mixed_string();
    let info = get_context(&fx.state, &Pos::none(), &Value::Str(s.clone())).unwrap();

    let rebuilt = append_context(
        &fx.state,
        &Pos::none(),
        &Value::Str(s.discard_context()),
        &info.to_value(),
    )
    .unwrap();
    assert_eq!(rebuilt.text(), s.text());
    assert_eq!(rebuilt.context(), s.context());
}

#[test]
fn test_introspection_recovers_record() {
    let fx = Fixture::default();
    let mut record = ContextInfoMap::new();
    record.insert(
        fx.print(&fx.drv),
        PathInfo {
            path: true,
            all_outputs: true,
            outputs: vec!["dev".to_string(), "out".to_string()],
        },
    );
    record.insert(fx.print(&fx.src), path_only());

    let rebuilt = append_context(
        &fx.state,
        &Pos::none(),
        &Value::string(""),
        &record.to_value(),
    )
    .unwrap();
    let info = get_context(&fx.state, &Pos::none(), &Value::Str(rebuilt)).unwrap();
    assert_eq!(info, record);
}

#[test]
fn test_json_record_with_explicit_false_facets() {
    let fx = Fixture::default();
    let json = format!(
        r#"{{ "{}": {{ "path": false, "allOutputs": false, "outputs": [] }} }}"#,
        fx.print(&fx.drv)
    );
    let record: ContextInfoMap = serde_json::from_str(&json).unwrap();
    let result = append_context_info(
        fx.state.store(),
        fx.state.settings(),
        &Pos::none(),
        &ContextualString::plain("kept"),
        &record,
    )
    .unwrap();
    assert_eq!(result.text(), "kept");
    assert!(!result.has_context());
}

#[test]
fn test_append_value_type_errors_surface() {
    let fx = Fixture::default();
    let info = Value::attrs([(
        fx.print(&fx.drv),
        Value::attrs([("allOutputs", Value::string("yes"))]),
    )]);
    let err = append_context(&fx.state, &Pos::none(), &Value::string(""), &info).unwrap_err();
    let ContextError::Eval(eval) = err else {
        panic!("expected an evaluation error");
    };
    assert!(eval.to_string().contains("`allOutputs` attribute"));

    let err = append_context(&fx.state, &Pos::none(), &Value::string(""), &Value::Bool(true))
        .unwrap_err();
    assert!(err.to_string().contains("second argument passed to builtins.appendContext"));
}

#[test]
fn test_derivation_check_precedes_output_names() {
    let fx = Fixture::default();
    let info = Value::attrs([(
        fx.print(&fx.src),
        Value::attrs([
            ("allOutputs", Value::Bool(true)),
            ("outputs", Value::list(vec![Value::Bool(true)])),
        ]),
    )]);
    let err = append_context(&fx.state, &Pos::none(), &Value::string(""), &info).unwrap_err();
    assert!(matches!(
        err,
        ContextError::NotADerivation {
            facet: DrvFacet::AllOutputs,
            ..
        }
    ));

    let info = Value::attrs([(
        fx.print(&fx.src),
        Value::attrs([("outputs", Value::list(vec![Value::Bool(true)]))]),
    )]);
    let err = append_context(&fx.state, &Pos::none(), &Value::string(""), &info).unwrap_err();
    assert!(matches!(
        err,
        ContextError::NotADerivation {
            facet: DrvFacet::Outputs,
            ..
        }
    ));
}
