//! String Context: provenance tracking for build-description strings
//!
//! Text values carry the set of store paths, build-step descriptions and
//! build outputs they were built from. Downstream graph construction reads
//! dependencies off this context, so it must never be silently lost.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod eval;
pub mod logging;
pub mod primops;
pub mod store;
pub mod types;
pub mod value;
