//! Virtual boundary-node naming: construction and the deterministic parser
//! required by spec.md §4.7. Callers must not build virtual-node names by
//! hand — always go through [`VirtualNodeName::format`] /
//! [`VirtualNodeName::parse`] so the two stay in lockstep.

use std::fmt;

use crate::error::GraphError;

/// Direction of a virtual node: an inbound receptor (`v-in`) or an outbound
/// ligand (`v-out`).
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum VirtualDirection {
    In,
    Out,
}

impl fmt::Display for VirtualDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VirtualDirection::In => "v-in",
            VirtualDirection::Out => "v-out",
        })
    }
}

/// The parsed form of a virtual node name: `v-<dir>:<type>[_<node>]`.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct VirtualNodeName {
    pub direction: VirtualDirection,
    pub peer_type: String,
    pub peer_node: Option<String>,
}

impl VirtualNodeName {
    /// Build a `type`-granularity virtual node name: `v-in:<peerType>` or
    /// `v-out:<peerType>`.
    pub fn for_type(direction: VirtualDirection, peer_type: &str) -> Self {
        Self {
            direction,
            peer_type: peer_type.to_string(),
            peer_node: None,
        }
    }

    /// Build a `typeAndNode`-granularity virtual node name:
    /// `v-in:<peerType>_<peerNode>` or `v-out:<peerType>_<peerNode>`.
    pub fn for_type_and_node(direction: VirtualDirection, peer_type: &str, peer_node: &str) -> Self {
        Self {
            direction,
            peer_type: peer_type.to_string(),
            peer_node: Some(peer_node.to_string()),
        }
    }

    /// Render the canonical string form.
    pub fn format(&self) -> String {
        match &self.peer_node {
            Some(node) => format!("{}:{}_{}", self.direction, self.peer_type, node),
            None => format!("{}:{}", self.direction, self.peer_type),
        }
    }

    /// Parse `v-<dir>:<type>[_<node>]` into its three tokens. Fails with
    /// [`GraphError::MalformedVirtualNode`] on any deviation: missing `:`,
    /// an unrecognised direction prefix, or an empty peer type.
    pub fn parse(name: &str) -> Result<Self, GraphError> {
        let (prefix, rest) = name
            .split_once(':')
            .ok_or_else(|| GraphError::MalformedVirtualNode(name.to_string()))?;

        let direction = match prefix {
            "v-in" => VirtualDirection::In,
            "v-out" => VirtualDirection::Out,
            _ => return Err(GraphError::MalformedVirtualNode(name.to_string())),
        };

        if rest.is_empty() {
            return Err(GraphError::MalformedVirtualNode(name.to_string()));
        }

        let (peer_type, peer_node) = match rest.split_once('_') {
            Some((ty, node)) if !ty.is_empty() && !node.is_empty() => (ty.to_string(), Some(node.to_string())),
            Some(_) => return Err(GraphError::MalformedVirtualNode(name.to_string())),
            None => (rest.to_string(), None),
        };

        Ok(Self {
            direction,
            peer_type,
            peer_node,
        })
    }

    /// True for any string accepted by [`VirtualNodeName::parse`].
    pub fn is_virtual_node_name(name: &str) -> bool {
        name.starts_with("v-in:") || name.starts_with("v-out:")
    }
}
