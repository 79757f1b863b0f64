//! `pert-agent` — per-agent augmented state and the perturbation kernel for
//! the perturbation-dynamics simulation framework.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                        |
//! |------------------|-----------------------------------------------------------------|
//! | [`augmentation`] | Virtual boundary-node wiring (`type` / `typeAndNode` granularity) |
//! | [`computation`]  | [`Computation`]: the agent's state and `perturb`/`updateInput`    |
//! | [`error`]        | `AgentError`, `AgentResult`                                       |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                          |
//! |---------|------------------------------------------------------------------|
//! | `serde` | Propagates to `pert-core`/`pert-graph` so checkpointed state can be (de)serialized. |

pub mod augmentation;
pub mod computation;
pub mod error;

pub use augmentation::{augment_by_type, augment_by_type_and_node, Binding, PeerLink};
pub use computation::Computation;
pub use error::{AgentError, AgentResult};
