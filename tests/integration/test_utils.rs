//! Shared fixtures: a memory store with a source path and a derivation

use std::sync::Arc;
use string_context::context::{Context, ContextElement, ContextualString};
use string_context::eval::{EvalSettings, EvalState};
use string_context::store::{MemoryStore, Store, StorePath};

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub state: EvalState,
    /// Plain source path, present in the store
    pub src: StorePath,
    /// Build-step description, present in the store
    pub drv: StorePath,
    /// Output of `drv`
    pub out: StorePath,
}

impl Fixture {
    pub fn new(settings: EvalSettings) -> Self {
        let store = Arc::new(MemoryStore::new());
        let src = StorePath::from_content("source", b"fn main() {}").unwrap();
        let drv = StorePath::from_content("hello-2.12.drv", b"Derive(...)").unwrap();
        let out = StorePath::from_content("hello-2.12", b"ELF").unwrap();
        store.add_valid(src.clone());
        store.add_valid(drv.clone());
        store.add_substitutable(out.clone());
        let state = EvalState::new(store.clone(), settings);
        Fixture {
            store,
            state,
            src,
            drv,
            out,
        }
    }

    pub fn print(&self, path: &StorePath) -> String {
        self.store.print_store_path(path)
    }

    /// `{Opaque(src), Built(drv, "out"), DrvDeep(drv)}`
    pub fn mixed_string(&self) -> ContextualString {
        let context: Context = [
            ContextElement::opaque(self.src.clone()),
            ContextElement::built(self.drv.clone(), "out"),
            ContextElement::drv_deep(self.drv.clone()),
        ]
        .into_iter()
        .collect();
        ContextualString::with_context("cc -o hello main.c", context)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new(EvalSettings::default())
    }
}
