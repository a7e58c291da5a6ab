//! Context elements: the atomic provenance facts

use crate::error::{ContextError, DrvFacet, StoreError};
use crate::store::{StoreDir, StorePath};
use crate::types::Pos;

/// One provenance fact carried by a string.
///
/// Ordering is by variant, then path, then output name; a set of elements
/// therefore iterates each derivation's outputs in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContextElement {
    /// The plain path must exist
    Opaque { path: StorePath },
    /// One named output of the build-step description at `drv_path`
    Built { drv_path: StorePath, output: String },
    /// The description itself and every output it can produce
    DrvDeep { drv_path: StorePath },
}

impl ContextElement {
    pub fn opaque(path: StorePath) -> Self {
        ContextElement::Opaque { path }
    }

    pub fn built(drv_path: StorePath, output: impl Into<String>) -> Self {
        ContextElement::Built {
            drv_path,
            output: output.into(),
        }
    }

    pub fn drv_deep(drv_path: StorePath) -> Self {
        ContextElement::DrvDeep { drv_path }
    }

    /// The store path this fact refers to
    pub fn path(&self) -> &StorePath {
        match self {
            ContextElement::Opaque { path } => path,
            ContextElement::Built { drv_path, .. } => drv_path,
            ContextElement::DrvDeep { drv_path } => drv_path,
        }
    }

    /// Compact textual form: `<path>`, `=<drv>` or `!<output>!<drv>`
    pub fn render(&self, dir: &StoreDir) -> String {
        match self {
            ContextElement::Opaque { path } => dir.print_path(path),
            ContextElement::DrvDeep { drv_path } => format!("={}", dir.print_path(drv_path)),
            ContextElement::Built { drv_path, output } => {
                format!("!{}!{}", output, dir.print_path(drv_path))
            }
        }
    }

    /// Inverse of [`ContextElement::render`]
    pub fn parse(dir: &StoreDir, s: &str) -> Result<Self, ContextError> {
        if let Some(rest) = s.strip_prefix('=') {
            let drv_path = dir.parse_path(rest)?;
            require_derivation(dir, &drv_path, DrvFacet::AllOutputs, &Pos::none())?;
            return Ok(ContextElement::DrvDeep { drv_path });
        }
        if let Some(rest) = s.strip_prefix('!') {
            let Some((output, path)) = rest.split_once('!') else {
                return Err(StoreError::InvalidPath(s.to_string()).into());
            };
            if output.is_empty() {
                return Err(StoreError::InvalidPath(s.to_string()).into());
            }
            let drv_path = dir.parse_path(path)?;
            require_derivation(dir, &drv_path, DrvFacet::Outputs, &Pos::none())?;
            return Ok(ContextElement::Built {
                drv_path,
                output: output.to_string(),
            });
        }
        Ok(ContextElement::Opaque {
            path: dir.parse_path(s)?,
        })
    }
}

/// Fail unless `path` names a build-step description
pub(crate) fn require_derivation(
    dir: &StoreDir,
    path: &StorePath,
    facet: DrvFacet,
    pos: &Pos,
) -> Result<(), ContextError> {
    if path.is_derivation() {
        return Ok(());
    }
    Err(ContextError::NotADerivation {
        path: dir.print_path(path),
        facet,
        pos: pos.clone(),
    })
}
