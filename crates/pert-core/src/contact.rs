//! `ContactEdge`: the inter-agent interaction record driving both graph
//! augmentation (`pert-agent`) and the boundary-exchange contact-gate test
//! (`pert-exchange`). Spec.md §3.
//!
//! Parsing these from an interaction file is explicitly out of scope (spec.md
//! §1, §6) — callers construct `ContactEdge` values directly from
//! already-parsed data.

/// A directed interaction between a node in one agent's graph and a node in
/// another agent's graph, active at a finite set of time stamps.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactEdge {
    pub src_node: String,
    pub dst_node: String,
    pub src_type: String,
    pub dst_type: String,
    pub weight: f64,
    /// Finite set of real time stamps in `[0, T_max]`. If the original
    /// interaction data gave no explicit times, callers should populate this
    /// with the full contact grid `{k * delta_t : 0 <= k < inter_type_iterations}`
    /// before constructing the edge — `ContactEdge` itself does not default
    /// the set, since it has no way to know `delta_t` or the iteration count.
    pub contact_times: Vec<f64>,
}

impl ContactEdge {
    /// True iff any contact time falls in the half-open interval
    /// `[lower, upper)`. Mirrors the original implementation's
    /// `setDoubleContainsInterval` (`original_source/src/utils/mathUtilities.cxx`).
    ///
    /// # Panics
    /// If `lower > upper`.
    pub fn contains_interval(&self, lower: f64, upper: f64) -> bool {
        assert!(lower <= upper, "lower bound must not exceed upper bound");
        self.contact_times.iter().any(|&t| t >= lower && t < upper)
    }

    /// Count of contact times falling in `[lower, upper)`. Mirrors the
    /// original implementation's `setDoubleIntervalWidth`.
    ///
    /// # Panics
    /// If `lower > upper`.
    pub fn interval_width(&self, lower: f64, upper: f64) -> usize {
        assert!(lower <= upper, "lower bound must not exceed upper bound");
        self.contact_times.iter().filter(|&&t| t >= lower && t < upper).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(times: Vec<f64>) -> ContactEdge {
        ContactEdge {
            src_node: "ligand".to_string(),
            dst_node: "receptor".to_string(),
            src_type: "A".to_string(),
            dst_type: "B".to_string(),
            weight: 1.0,
            contact_times: times,
        }
    }

    #[test]
    fn contains_interval_is_half_open() {
        let e = edge(vec![1.0, 2.0]);
        assert!(e.contains_interval(0.0, 2.0));
        assert!(!e.contains_interval(2.0, 3.0), "upper bound is exclusive");
        assert!(e.contains_interval(2.0, 2.1));
    }

    #[test]
    fn interval_width_counts_all_matches() {
        let e = edge(vec![1.0, 1.5, 1.9, 3.0]);
        assert_eq!(e.interval_width(1.0, 2.0), 3);
        assert_eq!(e.interval_width(3.0, 4.0), 1);
    }
}
