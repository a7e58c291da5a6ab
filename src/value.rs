//! Values at the evaluator boundary
//!
//! Just enough of a lazy value model to exercise forcing and coercion:
//! thunks are memoised in place, and coercion decides which kind of context
//! element a store-path-bearing value contributes.

use crate::context::{Context, ContextElement, ContextualString};
use crate::error::EvalError;
use crate::store::{StoreDir, StorePath};
use crate::types::Pos;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// One selected output of a derivation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivation {
    pub drv_path: StorePath,
    pub output: String,
    pub out_path: StorePath,
}

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Str(ContextualString),
    /// A plain store path; coerces with `Opaque` context
    Path(StorePath),
    /// A derivation's description path; coerces with `DrvDeep` context
    DrvPath(StorePath),
    /// A derivation output; coerces to its output path with `Built` context
    Derivation(Rc<Derivation>),
    List(Rc<Vec<Value>>),
    Attrs(Rc<BTreeMap<String, Value>>),
    Thunk(Thunk),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Path(a), Value::Path(b)) => a == b,
            (Value::DrvPath(a), Value::DrvPath(b)) => a == b,
            (Value::Derivation(a), Value::Derivation(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Attrs(a), Value::Attrs(b)) => a == b,
            (Value::Thunk(a), Value::Thunk(b)) => Rc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }
}

impl Value {
    pub fn string(text: &str) -> Self {
        Value::Str(ContextualString::plain(text))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(items))
    }

    pub fn attrs<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Attrs(Rc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn derivation(drv_path: StorePath, output: impl Into<String>, out_path: StorePath) -> Self {
        Value::Derivation(Rc::new(Derivation {
            drv_path,
            output: output.into(),
            out_path,
        }))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "a Boolean",
            Value::Str(_) => "a string",
            Value::Path(_) | Value::DrvPath(_) => "a path",
            Value::Derivation(_) => "a derivation",
            Value::List(_) => "a list",
            Value::Attrs(_) => "a set",
            Value::Thunk(_) => "a thunk",
        }
    }

    /// Evaluate to weak head normal form
    pub fn force(&self, pos: &Pos) -> Result<Value, EvalError> {
        match self {
            Value::Thunk(thunk) => thunk.force(pos),
            other => Ok(other.clone()),
        }
    }

    pub fn force_bool(&self, pos: &Pos, hint: &str) -> Result<bool, EvalError> {
        match self.force(pos).map_err(|e| e.traced(hint))? {
            Value::Bool(b) => Ok(b),
            other => Err(type_mismatch("a Boolean", &other, pos).traced(hint)),
        }
    }

    pub fn force_list(&self, pos: &Pos, hint: &str) -> Result<Rc<Vec<Value>>, EvalError> {
        match self.force(pos).map_err(|e| e.traced(hint))? {
            Value::List(items) => Ok(items),
            other => Err(type_mismatch("a list", &other, pos).traced(hint)),
        }
    }

    pub fn force_attrs(
        &self,
        pos: &Pos,
        hint: &str,
    ) -> Result<Rc<BTreeMap<String, Value>>, EvalError> {
        match self.force(pos).map_err(|e| e.traced(hint))? {
            Value::Attrs(attrs) => Ok(attrs),
            other => Err(type_mismatch("a set", &other, pos).traced(hint)),
        }
    }

    /// Force to a string, keeping its context; no coercion
    pub fn force_string(&self, pos: &Pos, hint: &str) -> Result<ContextualString, EvalError> {
        match self.force(pos).map_err(|e| e.traced(hint))? {
            Value::Str(s) => Ok(s),
            other => Err(type_mismatch("a string", &other, pos).traced(hint)),
        }
    }

    /// Force to a string that must not carry any context
    pub fn force_string_no_context(&self, pos: &Pos, hint: &str) -> Result<String, EvalError> {
        let s = self.force_string(pos, hint)?;
        if s.has_context() {
            return Err(EvalError::UnexpectedContext {
                text: s.text().to_string(),
                pos: pos.clone(),
            }
            .traced(hint));
        }
        Ok(s.text().to_string())
    }

    /// Coerce to a string, deriving context from store-path-bearing values.
    ///
    /// Sets with an `outPath` attribute coerce through that attribute.
    pub fn coerce_to_string(
        &self,
        dir: &StoreDir,
        pos: &Pos,
        hint: &str,
    ) -> Result<ContextualString, EvalError> {
        self.coerce_inner(dir, pos).map_err(|e| e.traced(hint))
    }

    fn coerce_inner(&self, dir: &StoreDir, pos: &Pos) -> Result<ContextualString, EvalError> {
        match self.force(pos)? {
            Value::Str(s) => Ok(s),
            Value::Path(path) => Ok(with_element(dir, &path, ContextElement::opaque(path.clone()))),
            Value::DrvPath(drv_path) => Ok(with_element(
                dir,
                &drv_path,
                ContextElement::drv_deep(drv_path.clone()),
            )),
            Value::Derivation(drv) => Ok(with_element(
                dir,
                &drv.out_path,
                ContextElement::built(drv.drv_path.clone(), drv.output.clone()),
            )),
            Value::Attrs(attrs) => match attrs.get("outPath") {
                Some(out_path) => out_path.coerce_inner(dir, pos),
                None => Err(EvalError::NotCoercible {
                    found: "a set",
                    pos: pos.clone(),
                }),
            },
            other => Err(EvalError::NotCoercible {
                found: other.type_name(),
                pos: pos.clone(),
            }),
        }
    }
}

fn with_element(dir: &StoreDir, shown: &StorePath, elem: ContextElement) -> ContextualString {
    let mut context = Context::new();
    context.insert(elem);
    ContextualString::with_context(dir.print_path(shown), context)
}

fn type_mismatch(expected: &'static str, found: &Value, pos: &Pos) -> EvalError {
    EvalError::TypeMismatch {
        expected,
        found: found.type_name(),
        pos: pos.clone(),
    }
}

impl From<ContextualString> for Value {
    fn from(s: ContextualString) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

type Suspended = Box<dyn FnOnce() -> Result<Value, EvalError>>;

enum ThunkState {
    Pending(Suspended),
    Forcing,
    Done(Result<Value, EvalError>),
}

/// Deferred computation, evaluated at most once.
///
/// The outcome is memoised, including failures. Forcing a thunk from within
/// its own computation is infinite recursion.
#[derive(Clone)]
pub struct Thunk(Rc<RefCell<ThunkState>>);

impl Thunk {
    pub fn new(f: impl FnOnce() -> Result<Value, EvalError> + 'static) -> Self {
        Thunk(Rc::new(RefCell::new(ThunkState::Pending(Box::new(f)))))
    }

    pub fn is_forced(&self) -> bool {
        matches!(&*self.0.borrow(), ThunkState::Done(_))
    }

    pub fn force(&self, pos: &Pos) -> Result<Value, EvalError> {
        let suspended = {
            let mut state = self.0.borrow_mut();
            match std::mem::replace(&mut *state, ThunkState::Forcing) {
                ThunkState::Pending(f) => f,
                ThunkState::Forcing => {
                    return Err(EvalError::InfiniteRecursion { pos: pos.clone() });
                }
                ThunkState::Done(result) => {
                    *state = ThunkState::Done(result.clone());
                    return result;
                }
            }
        };

        let result = suspended().and_then(|value| value.force(pos));
        *self.0.borrow_mut() = ThunkState::Done(result.clone());
        result
    }
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0.borrow() {
            ThunkState::Pending(_) => write!(f, "Thunk(<pending>)"),
            ThunkState::Forcing => write!(f, "Thunk(<forcing>)"),
            ThunkState::Done(result) => write!(f, "Thunk({:?})", result),
        }
    }
}
