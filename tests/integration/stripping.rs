//! unsafeDiscardStringContext / unsafeDiscardOutputDependency

use super::test_utils::Fixture;
use string_context::context::{Context, ContextElement, ContextualString};
use string_context::primops::{lookup, unsafe_discard_output_dependency, unsafe_discard_string_context};
use string_context::types::Pos;
use string_context::value::Value;

#[test]
fn test_discard_string_context_keeps_text() {
    let fx = Fixture::default();
    let s = fx.mixed_string();
    let stripped = unsafe_discard_string_context(&fx.state, &Pos::none(), &Value::Str(s.clone()))
        .unwrap();
    assert_eq!(stripped.text(), s.text());
    assert!(stripped.context().is_empty());

    let again =
        unsafe_discard_string_context(&fx.state, &Pos::none(), &Value::Str(stripped.clone()))
            .unwrap();
    assert_eq!(again, stripped);
}

#[test]
fn test_discard_string_context_coerces_paths() {
    let fx = Fixture::default();
    let stripped =
        unsafe_discard_string_context(&fx.state, &Pos::none(), &Value::DrvPath(fx.drv.clone()))
            .unwrap();
    assert_eq!(stripped.text(), fx.print(&fx.drv));
    assert!(!stripped.has_context());
}

#[test]
fn test_discard_output_dependency_downgrades_only_drv_deep() {
    let fx = Fixture::default();
    let weakened =
        unsafe_discard_output_dependency(&fx.state, &Pos::none(), &Value::Str(fx.mixed_string()))
            .unwrap();
    let expected: Context = [
        ContextElement::opaque(fx.src.clone()),
        ContextElement::built(fx.drv.clone(), "out"),
        ContextElement::opaque(fx.drv.clone()),
    ]
    .into_iter()
    .collect();
    assert_eq!(weakened.context(), &expected);
    assert_eq!(weakened.text(), fx.mixed_string().text());
}

#[test]
fn test_discard_output_dependency_of_drv_path() {
    let fx = Fixture::default();
    let weakened =
        unsafe_discard_output_dependency(&fx.state, &Pos::none(), &Value::DrvPath(fx.drv.clone()))
            .unwrap();
    assert_eq!(weakened.context().len(), 1);
    assert!(weakened
        .context()
        .contains(&ContextElement::opaque(fx.drv.clone())));
}

#[test]
fn test_discard_output_dependency_noop_without_drv_deep() {
    let fx = Fixture::default();
    let s = ContextualString::with_context(
        "x",
        [
            ContextElement::opaque(fx.src.clone()),
            ContextElement::built(fx.drv.clone(), "out"),
        ]
        .into_iter()
        .collect(),
    );
    let weakened =
        unsafe_discard_output_dependency(&fx.state, &Pos::none(), &Value::Str(s.clone())).unwrap();
    assert_eq!(weakened, s);
}

#[test]
fn test_registry_dispatch_returns_strings() {
    let fx = Fixture::default();
    let out = lookup("__unsafeDiscardStringContext")
        .unwrap()
        .call(&fx.state, &Pos::none(), &[Value::Str(fx.mixed_string())])
        .unwrap();
    let Value::Str(s) = out else {
        panic!("expected a string");
    };
    assert!(!s.has_context());
}
