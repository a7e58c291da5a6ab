//! Context reconstruction
//!
//! Validates a per-path record against the store and merges the facts it
//! describes into a string's context. All-or-nothing: elements are staged in
//! a scratch context and merged only once every entry has been accepted.

use crate::context::element::require_derivation;
use crate::context::{Context, ContextElement, ContextInfoMap, ContextRecord, ContextualString};
use crate::error::{ContextError, DrvFacet};
use crate::eval::EvalSettings;
use crate::store::{Store, StorePath};
use crate::types::Pos;
use tracing::debug;

/// Merge a typed record into `base`'s context
pub fn append_context_info(
    store: &dyn Store,
    settings: &EvalSettings,
    pos: &Pos,
    base: &ContextualString,
    info: &ContextInfoMap,
) -> Result<ContextualString, ContextError> {
    let staged = stage_entries(
        store,
        settings,
        pos,
        info.iter().map(|(key, info)| (key.as_str(), info)),
    )?;
    Ok(base.merge_context(staged))
}

/// Validate entries in order and collect the elements they describe.
///
/// Each entry is processed as: parse key, ensure the path (unless read-only),
/// then read and check its facets one by one. The first failure aborts the call.
pub fn stage_entries<'a, R, I>(
    store: &dyn Store,
    settings: &EvalSettings,
    pos: &Pos,
    entries: I,
) -> Result<Context, ContextError>
where
    R: ContextRecord + ?Sized + 'a,
    I: IntoIterator<Item = (&'a str, &'a R)>,
{
    let mut staged = Context::new();
    for (key, record) in entries {
        let path = store
            .parse_store_path(key)
            .map_err(|_| ContextError::InvalidContextKey {
                key: key.to_string(),
                pos: pos.clone(),
            })?;

        if !settings.read_only_mode {
            debug!(path = key, "ensuring context path");
            store.ensure_path(&path)?;
        }

        stage_record(store, pos, &path, record, &mut staged)?;
    }
    Ok(staged)
}

fn stage_record<R: ContextRecord + ?Sized>(
    store: &dyn Store,
    pos: &Pos,
    path: &StorePath,
    record: &R,
    staged: &mut Context,
) -> Result<(), ContextError> {
    let dir = store.store_dir();

    if record.path(pos)? {
        staged.insert(ContextElement::opaque(path.clone()));
    }

    if record.all_outputs(pos)? {
        require_derivation(dir, path, DrvFacet::AllOutputs, pos)?;
        staged.insert(ContextElement::drv_deep(path.clone()));
    }

    let outputs = record.outputs(pos)?;
    if !outputs.is_empty() {
        require_derivation(dir, path, DrvFacet::Outputs, pos)?;
        for output in outputs.force(pos)? {
            debug!(path = %path, output = %output, "staging output context");
            staged.insert(ContextElement::built(path.clone(), output));
        }
    }
    Ok(())
}
