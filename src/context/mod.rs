//! String Context
//!
//! Strings carry a set of provenance facts recording which store paths,
//! build-step descriptions and build outputs went into them. Context only
//! grows through concatenation; the discard operations are the sole way to
//! shrink or weaken it.

pub mod element;
pub mod info;
pub mod reconstruct;

pub use element::ContextElement;
pub use info::{ContextInfoMap, ContextRecord, OutputList, PathInfo};
pub use reconstruct::append_context_info;

use crate::store::{StoreDir, StorePath};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Deduplicated set of context elements, stored flat
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Context {
    elems: BTreeSet<ContextElement>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn contains(&self, elem: &ContextElement) -> bool {
        self.elems.contains(elem)
    }

    pub fn insert(&mut self, elem: ContextElement) -> bool {
        self.elems.insert(elem)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContextElement> {
        self.elems.iter()
    }

    /// Set union; neither operand is modified
    pub fn union(&self, other: &Context) -> Context {
        Context {
            elems: self.elems.union(&other.elems).cloned().collect(),
        }
    }

    /// Replace every `DrvDeep{p}` with `Opaque{p}`
    pub fn discard_output_dependency(&self) -> Context {
        self.elems
            .iter()
            .map(|elem| match elem {
                ContextElement::DrvDeep { drv_path } => ContextElement::Opaque {
                    path: drv_path.clone(),
                },
                other => other.clone(),
            })
            .collect()
    }

    /// Group by path into the introspection record
    pub fn info(&self, dir: &StoreDir) -> ContextInfoMap {
        ContextInfoMap::from_context(self, dir)
    }

    /// Every distinct path referenced, regardless of element kind
    pub fn paths(&self) -> BTreeSet<&StorePath> {
        self.elems.iter().map(ContextElement::path).collect()
    }
}

impl FromIterator<ContextElement> for Context {
    fn from_iter<I: IntoIterator<Item = ContextElement>>(iter: I) -> Self {
        Context {
            elems: iter.into_iter().collect(),
        }
    }
}

impl Extend<ContextElement> for Context {
    fn extend<I: IntoIterator<Item = ContextElement>>(&mut self, iter: I) {
        self.elems.extend(iter)
    }
}

impl<'a> IntoIterator for &'a Context {
    type Item = &'a ContextElement;
    type IntoIter = std::collections::btree_set::Iter<'a, ContextElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elems.iter()
    }
}

/// Immutable text paired with its context.
///
/// Cloning shares both the text and the context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextualString {
    text: Arc<str>,
    context: Arc<Context>,
}

impl ContextualString {
    /// String literal: no context
    pub fn plain(text: impl Into<Arc<str>>) -> Self {
        ContextualString {
            text: text.into(),
            context: Arc::new(Context::new()),
        }
    }

    pub fn with_context(text: impl Into<Arc<str>>, context: Context) -> Self {
        ContextualString {
            text: text.into(),
            context: Arc::new(context),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn has_context(&self) -> bool {
        !self.context.is_empty()
    }

    /// Concatenate; the result carries the union of both contexts
    pub fn concat(&self, other: &ContextualString) -> ContextualString {
        let mut text = String::with_capacity(self.text.len() + other.text.len());
        text.push_str(&self.text);
        text.push_str(&other.text);
        let context = if other.context.is_empty() {
            Arc::clone(&self.context)
        } else if self.context.is_empty() {
            Arc::clone(&other.context)
        } else {
            Arc::new(self.context.union(&other.context))
        };
        ContextualString {
            text: text.into(),
            context,
        }
    }

    /// Same text, empty context.
    ///
    /// Unsafe in the build-graph sense: any dependency the context recorded
    /// becomes invisible to whoever consumes the result.
    pub fn discard_context(&self) -> ContextualString {
        ContextualString {
            text: Arc::clone(&self.text),
            context: Arc::new(Context::new()),
        }
    }

    /// Same text, every `DrvDeep` downgraded to `Opaque`
    pub fn discard_output_dependency(&self) -> ContextualString {
        ContextualString {
            text: Arc::clone(&self.text),
            context: Arc::new(self.context.discard_output_dependency()),
        }
    }

    /// Same text, context extended with `extra`
    pub fn merge_context(&self, extra: Context) -> ContextualString {
        if extra.is_empty() {
            return self.clone();
        }
        ContextualString {
            text: Arc::clone(&self.text),
            context: Arc::new(self.context.union(&extra)),
        }
    }
}

impl fmt::Display for ContextualString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for ContextualString {
    fn from(text: &str) -> Self {
        ContextualString::plain(text)
    }
}
