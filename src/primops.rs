//! Context Primitive Operations
//!
//! The builtins that inspect, weaken, strip and rebuild string context.
//! Each has a typed entry point operating on [`Value`]s and an entry in the
//! [`PRIMOPS`] table used by the evaluator's dispatcher.

use crate::context::reconstruct::stage_entries;
use crate::context::{ContextInfoMap, ContextualString};
use crate::error::{ContextError, EvalError};
use crate::eval::EvalState;
use crate::types::Pos;
use crate::value::Value;
use tracing::trace;

/// Strip every context element, keeping the text.
///
/// Misuse hides real dependencies from the build graph.
pub fn unsafe_discard_string_context(
    state: &EvalState,
    pos: &Pos,
    s: &Value,
) -> Result<ContextualString, ContextError> {
    let s = s.coerce_to_string(
        state.store_dir(),
        pos,
        "while evaluating the argument passed to builtins.unsafeDiscardStringContext",
    )?;
    Ok(s.discard_context())
}

/// Downgrade whole-derivation references to plain references to the
/// description file, so it is treated as a source rather than built.
pub fn unsafe_discard_output_dependency(
    state: &EvalState,
    pos: &Pos,
    s: &Value,
) -> Result<ContextualString, ContextError> {
    let s = s.coerce_to_string(
        state.store_dir(),
        pos,
        "while evaluating the argument passed to builtins.unsafeDiscardOutputDependency",
    )?;
    Ok(s.discard_output_dependency())
}

pub fn has_context(state: &EvalState, pos: &Pos, s: &Value) -> Result<bool, ContextError> {
    let s = s.coerce_to_string(
        state.store_dir(),
        pos,
        "while evaluating the argument passed to builtins.hasContext",
    )?;
    Ok(s.has_context())
}

/// Group the string's context by path into the introspection record
pub fn get_context(state: &EvalState, pos: &Pos, s: &Value) -> Result<ContextInfoMap, ContextError> {
    let s = s.force_string(
        pos,
        "while evaluating the argument passed to builtins.getContext",
    )?;
    Ok(s.context().info(state.store_dir()))
}

/// Add the context described by `info` to the string `s`.
///
/// Keys are validated and, outside read-only mode, realised in key order.
/// Nothing is merged unless every entry is accepted.
pub fn append_context(
    state: &EvalState,
    pos: &Pos,
    s: &Value,
    info: &Value,
) -> Result<ContextualString, ContextError> {
    let orig = s.force_string(
        &Pos::none(),
        "while evaluating the first argument passed to builtins.appendContext",
    )?;
    let attrs = info.force_attrs(
        pos,
        "while evaluating the second argument passed to builtins.appendContext",
    )?;
    trace!(entries = attrs.len(), "appending string context");

    let staged = stage_entries(
        state.store(),
        state.settings(),
        pos,
        attrs.iter().map(|(key, value)| (key.as_str(), value)),
    )?;
    Ok(orig.merge_context(staged))
}

pub type PrimOpFn = fn(&EvalState, &Pos, &[Value]) -> Result<Value, ContextError>;

/// Registration record for one builtin
pub struct PrimOp {
    pub name: &'static str,
    pub args: &'static [&'static str],
    pub doc: Option<&'static str>,
    pub fun: PrimOpFn,
}

impl PrimOp {
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Check arity and dispatch
    pub fn call(&self, state: &EvalState, pos: &Pos, args: &[Value]) -> Result<Value, ContextError> {
        if args.len() != self.arity() {
            return Err(EvalError::Arity {
                name: self.name,
                expected: self.arity(),
                got: args.len(),
                pos: pos.clone(),
            }
            .into());
        }
        (self.fun)(state, pos, args)
    }
}

impl std::fmt::Debug for PrimOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimOp")
            .field("name", &self.name)
            .field("args", &self.args)
            .finish()
    }
}

pub static PRIMOPS: &[PrimOp] = &[
    PrimOp {
        name: "__unsafeDiscardStringContext",
        args: &["s"],
        doc: None,
        fun: |state, pos, args| unsafe_discard_string_context(state, pos, &args[0]).map(Value::Str),
    },
    PrimOp {
        name: "__unsafeDiscardOutputDependency",
        args: &["s"],
        doc: None,
        fun: |state, pos, args| {
            unsafe_discard_output_dependency(state, pos, &args[0]).map(Value::Str)
        },
    },
    PrimOp {
        name: "__hasContext",
        args: &["s"],
        doc: Some(
            "Return `true` if string *s* has a non-empty context. \
             The context can be obtained with `getContext`.",
        ),
        fun: |state, pos, args| has_context(state, pos, &args[0]).map(Value::Bool),
    },
    PrimOp {
        name: "__getContext",
        args: &["s"],
        doc: Some(
            "Return the string context of *s*: a set keyed by store path whose \
             values record `path`, `allOutputs` and `outputs` references.",
        ),
        fun: |state, pos, args| get_context(state, pos, &args[0]).map(|info| info.to_value()),
    },
    PrimOp {
        name: "__appendContext",
        args: &["s", "context"],
        doc: None,
        fun: |state, pos, args| append_context(state, pos, &args[0], &args[1]).map(Value::Str),
    },
];

/// Find a builtin by its registered name
pub fn lookup(name: &str) -> Option<&'static PrimOp> {
    PRIMOPS.iter().find(|op| op.name == name)
}
