//! `pert-graph` — the weighted directed graph backing each agent's intra-type
//! state, and the virtual boundary-node naming scheme used to wire agents
//! together (spec.md §3, §4.2, §4.7).
//!
//! Graph augmentation (adding virtual nodes for peer types) is not performed
//! here — it needs the peer-type list and granularity policy from
//! `pert-core::SimConfig`, and it feeds `pert-operators`'s pseudoinverse
//! cache. That orchestration lives in `pert-agent`; this crate only provides
//! the graph data structure and the naming scheme it is built from.

pub mod error;
pub mod graph;
pub mod virtual_node;

pub use error::{GraphError, GraphResult};
pub use graph::{WeightedEdgeGraph, EDGE_TOLERANCE};
pub use virtual_node::{VirtualDirection, VirtualNodeName};
