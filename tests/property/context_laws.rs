//! Property-based tests for the algebra of string contexts

use proptest::prelude::*;
use std::sync::Arc;
use string_context::context::{
    append_context_info, Context, ContextElement, ContextInfoMap, ContextualString,
};
use string_context::eval::{EvalSettings, EvalState};
use string_context::primops;
use string_context::store::{MemoryStore, StoreDir, StorePath};
use string_context::types::Pos;
use string_context::value::Value;

fn pool_path(name: &str) -> StorePath {
    StorePath::from_content(name, name.as_bytes()).unwrap()
}

fn element_strategy() -> impl Strategy<Value = ContextElement> {
    let plain = prop::sample::select(vec!["src", "patch", "hello-2.12.drv", "lib.drv"]);
    let drv = prop::sample::select(vec!["hello-2.12.drv", "lib.drv"]);
    let output = prop::sample::select(vec!["out", "dev", "lib"]);
    prop_oneof![
        plain.prop_map(|name| ContextElement::opaque(pool_path(name))),
        (drv.clone(), output).prop_map(|(name, out)| ContextElement::built(pool_path(name), out)),
        drv.prop_map(|name| ContextElement::drv_deep(pool_path(name))),
    ]
}

fn string_strategy() -> impl Strategy<Value = ContextualString> {
    ("[a-z ]{0,12}", prop::collection::vec(element_strategy(), 0..6)).prop_map(
        |(text, elems)| ContextualString::with_context(text, elems.into_iter().collect::<Context>()),
    )
}

fn read_only_state() -> EvalState {
    EvalState::new(Arc::new(MemoryStore::new()), EvalSettings::read_only())
}

/// Stripping twice is the same as stripping once, and keeps the text
#[test]
fn test_discard_context_idempotent_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&string_strategy(), |s| {
            let once = s.discard_context();
            assert_eq!(once.discard_context(), once);
            assert_eq!(once.text(), s.text());
            assert!(!once.has_context());
            Ok(())
        })
        .unwrap();
}

/// Downgrading leaves no DrvDeep behind and only touches DrvDeep elements
#[test]
fn test_discard_output_dependency_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&string_strategy(), |s| {
            let once = s.discard_output_dependency();
            assert_eq!(once.discard_output_dependency(), once);
            assert!(!once
                .context()
                .iter()
                .any(|e| matches!(e, ContextElement::DrvDeep { .. })));
            for elem in s.context().iter() {
                let expected = match elem {
                    ContextElement::DrvDeep { drv_path } => {
                        ContextElement::opaque(drv_path.clone())
                    }
                    other => other.clone(),
                };
                assert!(once.context().contains(&expected));
            }
            Ok(())
        })
        .unwrap();
}

/// hasContext agrees with a non-empty getContext
#[test]
fn test_has_context_matches_introspection_property() {
    let state = read_only_state();
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&string_strategy(), |s| {
            let value = Value::Str(s.clone());
            let has = primops::has_context(&state, &Pos::none(), &value).unwrap();
            let info = primops::get_context(&state, &Pos::none(), &value).unwrap();
            assert_eq!(has, !info.is_empty());
            assert_eq!(has, !s.context().is_empty());
            Ok(())
        })
        .unwrap();
}

/// Reconstructing a stripped string from its introspection restores it
#[test]
fn test_round_trip_property() {
    let state = read_only_state();
    let dir = StoreDir::default();
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&string_strategy(), |s| {
            let info = ContextInfoMap::from_context(s.context(), &dir);
            let rebuilt = append_context_info(
                state.store(),
                state.settings(),
                &Pos::none(),
                &s.discard_context(),
                &info,
            )
            .unwrap();
            assert_eq!(rebuilt, s);
            assert_eq!(rebuilt.context().info(&dir), info);
            Ok(())
        })
        .unwrap();
}

/// Concatenation unions contexts
#[test]
fn test_concat_unions_context_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(string_strategy(), string_strategy()), |(a, b)| {
            let joined = a.concat(&b);
            assert_eq!(joined.text(), format!("{}{}", a.text(), b.text()));
            assert_eq!(*joined.context(), a.context().union(b.context()));
            Ok(())
        })
        .unwrap();
}
