//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, ContextError};

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Context(ContextError::InvalidContextKey { key, .. }) => {
            format!("error: context key '{}' is not a store path", key)
        }
        ApiError::Context(ContextError::NotADerivation { path, facet, .. }) => {
            format!(
                "error: cannot add {} context to '{}': not a derivation",
                facet, path
            )
        }
        other => format!("error: {}", other),
    }
}
