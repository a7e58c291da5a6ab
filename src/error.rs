//! Error types for the string context subsystem.

use crate::types::Pos;
use std::fmt;
use thiserror::Error;

/// Store-related errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("path '{0}' is not a valid store path")]
    InvalidPath(String),

    #[error("path '{0}' is not in the store directory '{1}'")]
    NotInStore(String, String),

    #[error("path '{0}' is not valid and cannot be realised")]
    CannotRealise(String),

    #[error("Storage database error: {0}")]
    Database(String),
}

/// Which facet of a context record requested derivation-only context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrvFacet {
    AllOutputs,
    Outputs,
}

impl fmt::Display for DrvFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrvFacet::AllOutputs => write!(f, "all-outputs"),
            DrvFacet::Outputs => write!(f, "derivation output"),
        }
    }
}

/// Failures raised while forcing or coercing values.
///
/// Cloneable so that a thunk can memoise the failure it produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("value is {found} while {expected} was expected, at {pos}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
        pos: Pos,
    },

    #[error("cannot coerce {found} to a string, at {pos}")]
    NotCoercible { found: &'static str, pos: Pos },

    #[error("the string '{text}' is not allowed to refer to a store path, at {pos}")]
    UnexpectedContext { text: String, pos: Pos },

    #[error("infinite recursion encountered, at {pos}")]
    InfiniteRecursion { pos: Pos },

    #[error("function '{name}' called with {got} arguments but expects {expected}, at {pos}")]
    Arity {
        name: &'static str,
        expected: usize,
        got: usize,
        pos: Pos,
    },

    #[error("{message}")]
    Thrown { message: String, pos: Pos },

    #[error("{hint}: {source}")]
    Trace {
        hint: String,
        #[source]
        source: Box<EvalError>,
    },
}

impl EvalError {
    /// Wrap with a "while evaluating ..." hint.
    pub fn traced(self, hint: impl Into<String>) -> Self {
        EvalError::Trace {
            hint: hint.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error, with every trace frame removed
    pub fn root(&self) -> &EvalError {
        match self {
            EvalError::Trace { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Errors raised by the context primitive operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("context key '{key}' is not a store path, at {pos}")]
    InvalidContextKey { key: String, pos: Pos },

    #[error("tried to add {facet} context of {path}, which is not a derivation, to a string, at {pos}")]
    NotADerivation {
        path: String,
        facet: DrvFacet,
        pos: Pos,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Application-level errors for configuration, logging and the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Context error: {0}")]
    Context(#[from] ContextError),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}
