//! `pert-operators` — the dissipation, conservation, and propagation
//! operators that make up the perturbation kernel (spec.md §4.4, §4.5).
//!
//! These types are pure functions of state plus time (and, for
//! `Dissipation::Random`, an RNG); the kernel that sequences them
//! (dissipate → conserve → propagate → saturate) lives in `pert-agent`,
//! which owns the augmented graph these operators are built from.

pub mod conservation;
pub mod dissipation;
pub mod error;
pub mod propagation;
pub mod weights;

pub use conservation::Conservation;
pub use dissipation::Dissipation;
pub use error::{OperatorError, OperatorResult};
pub use propagation::{Propagation, PropagationKind};
pub use weights::normalized_transposed_adjacency;
