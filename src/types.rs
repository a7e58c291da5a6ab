//! Shared primitive types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Source position of the expression that invoked an operation.
///
/// Carried by every user-facing error so the evaluator can point at the
/// offending call site. `Pos::none()` stands for "no position known".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub file: Option<Arc<str>>,
    pub line: u32,
    pub column: u32,
}

impl Pos {
    pub fn new(file: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Pos {
            file: Some(file.into()),
            line,
            column,
        }
    }

    pub fn none() -> Self {
        Pos::default()
    }

    pub fn is_none(&self) -> bool {
        self.file.is_none() && self.line == 0
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file, self.line, self.column),
            None if self.line > 0 => write!(f, "«string»:{}:{}", self.line, self.column),
            None => write!(f, "«none»"),
        }
    }
}
