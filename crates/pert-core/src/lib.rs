//! `pert-core` — foundational types for the perturbation-dynamics simulation
//! framework.
//!
//! This crate is a dependency of every other `pert-*` crate. It intentionally
//! has no `pert-*` dependencies and minimal external ones (only `rand`,
//! `thiserror`, and `tracing`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                  |
//! |-------------|------------------------------------------------------------|
//! | [`ids`]     | `TypeId`, `NodeIndex`, `Rank`                              |
//! | [`time`]    | `OuterStep`, `InnerStep`, `SimClock`                        |
//! | [`config`]  | `SimConfig`, `VirtualNodeGranularity`, `QuantizationMode`, `OutputMode` |
//! | [`rng`]     | `AgentRng` (per-type deterministic RNG)                    |
//! | [`contact`] | `ContactEdge` (inter-agent interaction record)             |
//! | [`error`]   | `PertError`, `PertResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. Required by `pert-checkpoint`. |

pub mod config;
pub mod contact;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{OutputMode, QuantizationMode, SimConfig, VirtualNodeGranularity};
pub use contact::ContactEdge;
pub use error::{PertError, PertResult};
pub use ids::{NodeIndex, Rank, TypeId};
pub use rng::AgentRng;
pub use time::{InnerStep, OuterStep, SimClock};
