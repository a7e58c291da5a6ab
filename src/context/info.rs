//! Context introspection record
//!
//! The structured, per-path view of a context: for every referenced path,
//! whether it is referenced plainly, as a whole derivation, and which of its
//! outputs are referenced. Absent facets are omitted, never emitted as
//! `false` or an empty list.

use crate::context::{Context, ContextElement};
use crate::error::EvalError;
use crate::store::StoreDir;
use crate::types::Pos;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::rc::Rc;

pub const FACET_PATH: &str = "path";
pub const FACET_ALL_OUTPUTS: &str = "allOutputs";
pub const FACET_OUTPUTS: &str = "outputs";

fn is_false(b: &bool) -> bool {
    !*b
}

/// Facets recorded for a single path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathInfo {
    #[serde(default, skip_serializing_if = "is_false")]
    pub path: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub all_outputs: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
}

impl PathInfo {
    pub fn is_empty(&self) -> bool {
        !self.path && !self.all_outputs && self.outputs.is_empty()
    }

    pub fn to_value(&self) -> Value {
        let mut attrs = BTreeMap::new();
        if self.path {
            attrs.insert(FACET_PATH.to_string(), Value::Bool(true));
        }
        if self.all_outputs {
            attrs.insert(FACET_ALL_OUTPUTS.to_string(), Value::Bool(true));
        }
        if !self.outputs.is_empty() {
            attrs.insert(
                FACET_OUTPUTS.to_string(),
                Value::list(self.outputs.iter().map(|o| Value::string(o)).collect()),
            );
        }
        Value::attrs(attrs)
    }

    /// Decode one record, forcing and type-checking each facet present.
    ///
    /// Unknown attribute names are ignored.
    pub fn from_value(value: &Value, pos: &Pos) -> Result<Self, EvalError> {
        Ok(PathInfo {
            path: value.path(pos)?,
            all_outputs: value.all_outputs(pos)?,
            outputs: value.outputs(pos)?.force(pos)?,
        })
    }
}

/// A per-path record whose facets are read one at a time.
///
/// Reconstruction reads `path`, then `allOutputs`, then `outputs`, and checks
/// each facet before reading the next. Output names are only forced once the
/// path is known to be a derivation.
pub trait ContextRecord {
    fn path(&self, pos: &Pos) -> Result<bool, EvalError>;
    fn all_outputs(&self, pos: &Pos) -> Result<bool, EvalError>;
    fn outputs(&self, pos: &Pos) -> Result<OutputList, EvalError>;
}

/// Output names of a record, possibly still unforced
#[derive(Debug, Clone)]
pub enum OutputList {
    Names(Vec<String>),
    Values(Rc<Vec<Value>>),
}

impl OutputList {
    pub fn is_empty(&self) -> bool {
        match self {
            OutputList::Names(names) => names.is_empty(),
            OutputList::Values(items) => items.is_empty(),
        }
    }

    /// Force every name; each must be a string without context
    pub fn force(self, pos: &Pos) -> Result<Vec<String>, EvalError> {
        match self {
            OutputList::Names(names) => Ok(names),
            OutputList::Values(items) => items
                .iter()
                .map(|item| {
                    item.force_string_no_context(
                        pos,
                        "while evaluating an output name within a string context",
                    )
                })
                .collect(),
        }
    }
}

impl ContextRecord for PathInfo {
    fn path(&self, _pos: &Pos) -> Result<bool, EvalError> {
        Ok(self.path)
    }

    fn all_outputs(&self, _pos: &Pos) -> Result<bool, EvalError> {
        Ok(self.all_outputs)
    }

    fn outputs(&self, _pos: &Pos) -> Result<OutputList, EvalError> {
        Ok(OutputList::Names(self.outputs.clone()))
    }
}

impl ContextRecord for Value {
    fn path(&self, pos: &Pos) -> Result<bool, EvalError> {
        match record_attrs(self, pos)?.get(FACET_PATH) {
            Some(v) => v.force_bool(
                pos,
                "while evaluating the `path` attribute of a string context",
            ),
            None => Ok(false),
        }
    }

    fn all_outputs(&self, pos: &Pos) -> Result<bool, EvalError> {
        match record_attrs(self, pos)?.get(FACET_ALL_OUTPUTS) {
            Some(v) => v.force_bool(
                pos,
                "while evaluating the `allOutputs` attribute of a string context",
            ),
            None => Ok(false),
        }
    }

    fn outputs(&self, pos: &Pos) -> Result<OutputList, EvalError> {
        match record_attrs(self, pos)?.get(FACET_OUTPUTS) {
            Some(v) => Ok(OutputList::Values(v.force_list(
                pos,
                "while evaluating the `outputs` attribute of a string context",
            )?)),
            None => Ok(OutputList::Names(Vec::new())),
        }
    }
}

fn record_attrs(value: &Value, pos: &Pos) -> Result<Rc<BTreeMap<String, Value>>, EvalError> {
    value.force_attrs(pos, "while evaluating the value of a string context")
}

/// Mapping from printed store path to its facets, ordered by path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextInfoMap(BTreeMap<String, PathInfo>);

impl ContextInfoMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group a flat context by path
    pub fn from_context(context: &Context, dir: &StoreDir) -> Self {
        let mut grouped: BTreeMap<String, PathInfo> = BTreeMap::new();
        for elem in context {
            let info = grouped.entry(dir.print_path(elem.path())).or_default();
            match elem {
                ContextElement::Opaque { .. } => info.path = true,
                ContextElement::DrvDeep { .. } => info.all_outputs = true,
                ContextElement::Built { output, .. } => info.outputs.push(output.clone()),
            }
        }
        // `Built` elements iterate by (path, output), so each list is already sorted
        ContextInfoMap(grouped)
    }

    pub fn insert(&mut self, path: impl Into<String>, info: PathInfo) -> Option<PathInfo> {
        self.0.insert(path.into(), info)
    }

    pub fn get(&self, path: &str) -> Option<&PathInfo> {
        self.0.get(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PathInfo)> {
        self.0.iter()
    }

    pub fn to_value(&self) -> Value {
        Value::attrs(self.0.iter().map(|(k, v)| (k.clone(), v.to_value())))
    }

    /// Decode a whole mapping eagerly
    pub fn from_value(value: &Value, pos: &Pos) -> Result<Self, EvalError> {
        let attrs = value.force_attrs(pos, "while evaluating a string context")?;
        let mut map = BTreeMap::new();
        for (key, v) in attrs.iter() {
            map.insert(key.clone(), PathInfo::from_value(v, pos)?);
        }
        Ok(ContextInfoMap(map))
    }
}

impl FromIterator<(String, PathInfo)> for ContextInfoMap {
    fn from_iter<I: IntoIterator<Item = (String, PathInfo)>>(iter: I) -> Self {
        ContextInfoMap(iter.into_iter().collect())
    }
}
