//! Framework error type.
//!
//! Sub-crates define their own error enums scoped to their own failure modes
//! (`GraphError`, `ScalingError`, `ExchangeError`, ...) and convert into
//! `PertError` via `From` impls at the crate boundaries that need to unify
//! them — chiefly `pert-sim`, which drives the whole run and must report a
//! single first cause on failure (spec.md §7).

use thiserror::Error;

use crate::TypeId;

/// The top-level error type for `pert-core` and the common currency at
/// crate boundaries that need to report a unified failure.
///
/// Variant groups follow the taxonomy of spec.md §7:
/// input-validation, state, resource, and exchange errors.
#[derive(Debug, Error)]
pub enum PertError {
    // ── Input-validation errors ────────────────────────────────────────────
    #[error("configuration error: {0}")]
    Config(String),

    #[error("non-positive iteration count: {0}")]
    NonPositiveIterations(i64),

    #[error("non-positive time step: {0}")]
    NonPositiveTimeStep(f64),

    #[error("conflicting configuration flags: {0}")]
    ConflictingFlags(String),

    #[error("parse error: {0}")]
    Parse(String),

    // ── State errors ───────────────────────────────────────────────────────
    #[error("agent type {0} not found")]
    TypeNotFound(TypeId),

    #[error("node {0:?} not found in graph")]
    NodeNotFound(String),

    #[error("duplicate node name: {0}")]
    DuplicateNode(String),

    #[error("malformed virtual node name: {0}")]
    MalformedVirtualNode(String),

    // ── Resource errors ─────────────────────────────────────────────────────
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ── Exchange errors ─────────────────────────────────────────────────────
    #[error("boundary exchange failure: {0}")]
    Exchange(String),

    // ── A warning promoted to an error by `treat_warnings_as_errors` ──────
    #[error("warning treated as error: {0}")]
    PromotedWarning(String),
}

/// Shorthand result type used across the `pert-*` crates.
pub type PertResult<T> = Result<T, PertError>;
