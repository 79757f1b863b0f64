//! [`ExchangePlan`]: the `byTypePair`/`byRankPair` wire-layout maps that
//! drive boundary exchange (spec.md §4.8). Built once from the full contact
//! list and the partition plan, then shared read-only across workers.

use rustc_hash::FxHashMap;

use pert_core::{ContactEdge, Rank, VirtualNodeGranularity};
use pert_graph::{VirtualDirection, VirtualNodeName};

use crate::partition::PartitionPlan;

/// One wired boundary-node pair: the sender's virtual-output node name and
/// the receiver's virtual-input node name.
pub type WirePair = (String, String);

/// The two aggregated maps the exchange protocol walks each outer tick.
pub struct ExchangePlan {
    by_type_pair: Vec<((String, String), Vec<WirePair>)>,
    by_rank_pair: FxHashMap<(Rank, Rank), Vec<WirePair>>,
}

impl ExchangePlan {
    /// Build the plan from `edges` (in a fixed, caller-supplied order — the
    /// order is load-bearing: both sender and receiver derive their buffer
    /// layout from the same deterministic pass over the same edge list).
    /// Same-type edges are dropped unless `same_type_communication` is set
    /// (spec.md §4.8).
    pub fn build(
        edges: &[ContactEdge],
        partition: &PartitionPlan,
        granularity: VirtualNodeGranularity,
        same_type_communication: bool,
    ) -> Self {
        let mut by_type_pair: Vec<((String, String), Vec<WirePair>)> = Vec::new();
        let mut index_of: FxHashMap<(String, String), usize> = FxHashMap::default();

        for edge in edges {
            if edge.src_type == edge.dst_type && !same_type_communication {
                continue;
            }

            let pair = Self::wire_pair(edge, granularity);
            let key = (edge.src_type.clone(), edge.dst_type.clone());
            let idx = *index_of.entry(key.clone()).or_insert_with(|| {
                by_type_pair.push((key, Vec::new()));
                by_type_pair.len() - 1
            });
            let bucket = &mut by_type_pair[idx].1;
            if !bucket.contains(&pair) {
                bucket.push(pair);
            }
        }

        let mut by_rank_pair: FxHashMap<(Rank, Rank), Vec<WirePair>> = FxHashMap::default();
        for ((src_type, dst_type), pairs) in &by_type_pair {
            let (Some(src_rank), Some(dst_rank)) = (partition.rank_of(src_type), partition.rank_of(dst_type)) else {
                continue;
            };
            by_rank_pair.entry((src_rank, dst_rank)).or_default().extend(pairs.iter().cloned());
        }

        Self { by_type_pair, by_rank_pair }
    }

    /// The `(voutName, vinName)` pair an edge resolves to under a given
    /// granularity. Exposed so callers needing the same join key outside
    /// this struct (e.g. `pert-exchange`'s contact map) derive it
    /// identically rather than duplicating the naming rule.
    pub fn wire_pair(edge: &ContactEdge, granularity: VirtualNodeGranularity) -> WirePair {
        match granularity {
            VirtualNodeGranularity::Type => (
                VirtualNodeName::for_type(VirtualDirection::Out, &edge.dst_type).format(),
                VirtualNodeName::for_type(VirtualDirection::In, &edge.src_type).format(),
            ),
            VirtualNodeGranularity::TypeAndNode => (
                VirtualNodeName::for_type_and_node(VirtualDirection::Out, &edge.dst_type, &edge.dst_node).format(),
                VirtualNodeName::for_type_and_node(VirtualDirection::In, &edge.src_type, &edge.src_node).format(),
            ),
        }
    }

    /// The wired virtual-node pairs for one `(sourceType, destType)` edge
    /// class, in the fixed order used to build the corresponding
    /// `by_rank_pair` slice.
    pub fn by_type_pair(&self, src_type: &str, dst_type: &str) -> &[WirePair] {
        self.by_type_pair
            .iter()
            .find(|((s, d), _)| s == src_type && d == dst_type)
            .map(|(_, pairs)| pairs.as_slice())
            .unwrap_or(&[])
    }

    /// The concatenated wire layout for everything flowing from `src_rank`
    /// to `dst_rank` — index `i` here matches index `i` of the same key on
    /// the peer.
    pub fn by_rank_pair(&self, src_rank: Rank, dst_rank: Rank) -> &[WirePair] {
        self.by_rank_pair.get(&(src_rank, dst_rank)).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Every `(sourceRank, destRank)` key with a non-empty wire layout —
    /// the set of peers a worker must post receives from / sends to.
    pub fn rank_pairs(&self) -> impl Iterator<Item = &(Rank, Rank)> {
        self.by_rank_pair.keys()
    }
}
