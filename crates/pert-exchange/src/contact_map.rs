//! The "interaction map" referenced by spec.md §4.8 step 4: contact times
//! keyed by the same `(voutName, vinName)` join the boundary-exchange wire
//! layout uses, so the contact-gate test works uniformly under either
//! virtual-node granularity.

use rustc_hash::FxHashMap;

use pert_core::{ContactEdge, VirtualNodeGranularity};
use pert_partition::{ExchangePlan, WirePair};

/// `(voutName, vinName) -> contact_times`, aggregated (by union) across
/// every [`ContactEdge`] that resolves to the same wire pair.
pub struct ContactMap {
    times: FxHashMap<WirePair, Vec<f64>>,
}

impl ContactMap {
    /// Build from the same edge list, granularity, and same-type filter
    /// used to build the matching [`ExchangePlan`] — the two must agree on
    /// which edges are dropped for the join keys to be found.
    pub fn build(edges: &[ContactEdge], granularity: VirtualNodeGranularity, same_type_communication: bool) -> Self {
        let mut times: FxHashMap<WirePair, Vec<f64>> = FxHashMap::default();
        for edge in edges {
            if edge.src_type == edge.dst_type && !same_type_communication {
                continue;
            }
            let key = ExchangePlan::wire_pair(edge, granularity);
            times.entry(key).or_default().extend(edge.contact_times.iter().copied());
        }
        Self { times }
    }

    pub fn contact_times(&self, vout_name: &str, vin_name: &str) -> &[f64] {
        self.times
            .get(&(vout_name.to_string(), vin_name.to_string()))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(times: Vec<f64>) -> ContactEdge {
        ContactEdge {
            src_node: "a".to_string(),
            dst_node: "b".to_string(),
            src_type: "A".to_string(),
            dst_type: "B".to_string(),
            weight: 1.0,
            contact_times: times,
        }
    }

    #[test]
    fn aggregates_times_for_identical_wire_pair() {
        let edges = vec![edge(vec![0.0, 1.0]), edge(vec![2.0])];
        let map = ContactMap::build(&edges, VirtualNodeGranularity::Type, false);
        let times = map.contact_times("v-out:B", "v-in:A");
        assert_eq!(times.len(), 3);
    }

    #[test]
    fn unknown_pair_is_empty() {
        let map = ContactMap::build(&[], VirtualNodeGranularity::Type, false);
        assert!(map.contact_times("v-out:X", "v-in:Y").is_empty());
    }
}
