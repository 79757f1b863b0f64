//! `pert-matrix` — dense matrix and column-vector primitives for the
//! perturbation-dynamics simulation framework.
//!
//! The [`Matrix`] type backs a graph's adjacency weights (`pert-graph`) and
//! an agent's state vectors (`pert-agent`). It is deliberately small:
//! row-major storage, bounds-checked access, the handful of in-place and
//! out-of-place arithmetic operators the perturbation kernel needs, and a
//! conversion to/from `nalgebra::DMatrix` for the one operation this crate
//! does not implement itself — the Moore-Penrose pseudoinverse used by
//! `pert-operators`'s `Propagation::Original`.

pub mod error;
pub mod matrix;

pub use error::{MatrixError, MatrixResult};
pub use matrix::{Matrix, NORMALIZE_EPSILON};
