//! Graph augmentation (spec.md §4.6): extending an agent's intra-type graph
//! with virtual boundary nodes for its peer interactions.
//!
//! Which internal node a virtual node wires to is interaction data (the
//! receptor/ligand of a [`pert_core::ContactEdge`]) — reading that data from
//! a file is out of scope (spec.md §1, §6), so these functions take
//! already-resolved bindings rather than an interaction-file path.

use pert_core::ContactEdge;
use pert_graph::{GraphResult, VirtualDirection, VirtualNodeName, WeightedEdgeGraph};

/// One peer type's virtual-node wiring under `type` granularity: up to one
/// inbound binding (a `v-in` node feeding a receptor) and up to one outbound
/// binding (a `v-out` node fed by a ligand).
#[derive(Clone, Debug)]
pub struct PeerLink {
    pub peer_type: String,
    pub inbound: Option<Binding>,
    pub outbound: Option<Binding>,
}

/// A virtual node's wiring to one internal node, with the edge weight the
/// virtual node's single edge carries.
#[derive(Clone, Debug)]
pub struct Binding {
    pub node: String,
    pub weight: f64,
}

/// Augment `graph` with one `v-in`/`v-out` pair per entry of `peer_links`
/// (spec.md §4.6 granularity `type`). Returns a new graph; `graph` itself is
/// untouched.
pub fn augment_by_type(graph: &WeightedEdgeGraph, peer_links: &[PeerLink]) -> GraphResult<WeightedEdgeGraph> {
    let mut augmented = graph.clone();
    for link in peer_links {
        if let Some(inbound) = &link.inbound {
            let v_in = VirtualNodeName::for_type(VirtualDirection::In, &link.peer_type);
            let v_in_idx = augmented.add_named_node(&v_in.format(), 0.0)?;
            let receptor_idx = augmented
                .index_of(&inbound.node)
                .ok_or_else(|| pert_graph::GraphError::NodeNotFound(inbound.node.clone()))?;
            augmented.add_edge(v_in_idx, receptor_idx, inbound.weight, true)?;
        }
        if let Some(outbound) = &link.outbound {
            let v_out = VirtualNodeName::for_type(VirtualDirection::Out, &link.peer_type);
            let v_out_idx = augmented.add_named_node(&v_out.format(), 0.0)?;
            let ligand_idx = augmented
                .index_of(&outbound.node)
                .ok_or_else(|| pert_graph::GraphError::NodeNotFound(outbound.node.clone()))?;
            augmented.add_edge(ligand_idx, v_out_idx, outbound.weight, true)?;
        }
    }
    Ok(augmented)
}

/// Augment `graph` lazily from individual contact edges (spec.md §4.6
/// granularity `typeAndNode`): exactly the virtual node pairs actually used
/// by some contact edge are created, each wired to the specific node the
/// edge names.
///
/// `outgoing` are edges where this agent is the source (its ligand feeds a
/// peer's receptor — wired here as `ligand -> v-out:peerType_peerNode`).
/// `incoming` are edges where this agent is the destination (wired as
/// `v-in:peerType_peerNode -> receptor`).
pub fn augment_by_type_and_node(
    graph: &WeightedEdgeGraph,
    outgoing: &[ContactEdge],
    incoming: &[ContactEdge],
) -> GraphResult<WeightedEdgeGraph> {
    let mut augmented = graph.clone();

    for edge in incoming {
        let v_in = VirtualNodeName::for_type_and_node(VirtualDirection::In, &edge.src_type, &edge.src_node);
        let name = v_in.format();
        let v_in_idx = match augmented.index_of(&name) {
            Some(idx) => idx,
            None => augmented.add_named_node(&name, 0.0)?,
        };
        let receptor_idx = augmented
            .index_of(&edge.dst_node)
            .ok_or_else(|| pert_graph::GraphError::NodeNotFound(edge.dst_node.clone()))?;
        augmented.add_edge(v_in_idx, receptor_idx, edge.weight, true)?;
    }

    for edge in outgoing {
        let v_out = VirtualNodeName::for_type_and_node(VirtualDirection::Out, &edge.dst_type, &edge.dst_node);
        let name = v_out.format();
        let v_out_idx = match augmented.index_of(&name) {
            Some(idx) => idx,
            None => augmented.add_named_node(&name, 0.0)?,
        };
        let ligand_idx = augmented
            .index_of(&edge.src_node)
            .ok_or_else(|| pert_graph::GraphError::NodeNotFound(edge.src_node.clone()))?;
        augmented.add_edge(ligand_idx, v_out_idx, edge.weight, true)?;
    }

    Ok(augmented)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_graph() -> WeightedEdgeGraph {
        WeightedEdgeGraph::with_names(&["R".to_string(), "L".to_string()]).unwrap()
    }

    #[test]
    fn type_granularity_adds_one_pair_per_peer() {
        let g = base_graph();
        let links = vec![PeerLink {
            peer_type: "Peer".to_string(),
            inbound: Some(Binding { node: "R".to_string(), weight: 1.0 }),
            outbound: Some(Binding { node: "L".to_string(), weight: 2.0 }),
        }];
        let augmented = augment_by_type(&g, &links).unwrap();
        assert_eq!(augmented.num_nodes(), 4);
        assert!(augmented.index_of("v-in:Peer").is_some());
        assert!(augmented.index_of("v-out:Peer").is_some());
        let v_in = augmented.index_of("v-in:Peer").unwrap();
        let r = augmented.index_of("R").unwrap();
        assert_eq!(augmented.edge_weight(v_in, r).unwrap(), 1.0);
    }

    #[test]
    fn type_granularity_skips_absent_bindings() {
        let g = base_graph();
        let links = vec![PeerLink {
            peer_type: "Peer".to_string(),
            inbound: None,
            outbound: Some(Binding { node: "L".to_string(), weight: 1.0 }),
        }];
        let augmented = augment_by_type(&g, &links).unwrap();
        assert_eq!(augmented.num_nodes(), 3);
        assert!(augmented.index_of("v-in:Peer").is_none());
    }

    #[test]
    fn original_graph_is_untouched() {
        let g = base_graph();
        let links = vec![PeerLink {
            peer_type: "Peer".to_string(),
            inbound: Some(Binding { node: "R".to_string(), weight: 1.0 }),
            outbound: None,
        }];
        let _ = augment_by_type(&g, &links).unwrap();
        assert_eq!(g.num_nodes(), 2);
    }

    #[test]
    fn type_and_node_granularity_creates_exactly_used_pairs() {
        let g = base_graph();
        let incoming = vec![ContactEdge {
            src_node: "n1".to_string(),
            dst_node: "R".to_string(),
            src_type: "Peer".to_string(),
            dst_type: "Local".to_string(),
            weight: 3.0,
            contact_times: vec![0.0],
        }];
        let augmented = augment_by_type_and_node(&g, &[], &incoming).unwrap();
        assert_eq!(augmented.num_nodes(), 3);
        assert!(augmented.index_of("v-in:Peer_n1").is_some());
    }

    #[test]
    fn type_and_node_granularity_reuses_existing_virtual_node() {
        let g = base_graph();
        let incoming = vec![
            ContactEdge {
                src_node: "n1".to_string(),
                dst_node: "R".to_string(),
                src_type: "Peer".to_string(),
                dst_type: "Local".to_string(),
                weight: 1.0,
                contact_times: vec![0.0],
            },
            ContactEdge {
                src_node: "n1".to_string(),
                dst_node: "R".to_string(),
                src_type: "Peer".to_string(),
                dst_type: "Local".to_string(),
                weight: 5.0,
                contact_times: vec![1.0],
            },
        ];
        let augmented = augment_by_type_and_node(&g, &[], &incoming).unwrap();
        assert_eq!(augmented.num_nodes(), 3, "the second edge reuses the same virtual node");
    }
}
