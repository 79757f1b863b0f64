//! Propagation operators (spec.md §4.4): spread the conserved state across
//! the augmented graph's topology.

use pert_graph::WeightedEdgeGraph;
use pert_matrix::Matrix;
use pert_scaling::ScalarFunction;

use crate::weights::normalized_transposed_adjacency;

/// Below this magnitude, `det(I - W̃)` is treated as zero and a singularity
/// warning is emitted (spec.md §4.4, §9 open question: proceed with the
/// pseudoinverse of the rank-deficient matrix rather than failing the run).
const SINGULARITY_TOLERANCE: f64 = 1e-10;

/// A propagation operator variant.
#[derive(Clone, Debug)]
pub enum Propagation {
    /// `apply(x,t) = omega(t) * M * x` where `M = (I - W̃)⁺` is built once
    /// at setup from the column-normalised transposed adjacency.
    Original { pseudoinverse: Matrix, omega: ScalarFunction },
    /// `apply(x,t) = x + omega(t) ⊙ (W̃ * x)` — no pseudoinverse, cheaper to
    /// build and evaluate.
    Neighbors { w_tilde: Matrix, omega: ScalarFunction },
    /// Structurally identical to `Neighbors`; exists so callers can swap in
    /// a bespoke `omega` without being confused with the baseline variant.
    Custom { w_tilde: Matrix, omega: ScalarFunction },
}

impl Propagation {
    /// Build the `Original` variant: construct `W̃`, compute
    /// `det(I - W̃)` to decide whether to emit a singularity warning, and
    /// compute the Moore-Penrose pseudoinverse via `nalgebra`'s SVD.
    pub fn original(graph: &WeightedEdgeGraph, omega: ScalarFunction) -> Self {
        let w_tilde = normalized_transposed_adjacency(graph);
        let n = w_tilde.rows();
        let identity_minus_w = Matrix::identity(n).sub(&w_tilde).expect("same dimensions by construction");

        let na_matrix = identity_minus_w.to_nalgebra();
        let det = na_matrix.clone().determinant();
        if det.abs() <= SINGULARITY_TOLERANCE {
            tracing::warn!(
                determinant = det,
                "I - W~ is not invertible; the pseudoinverse may produce degenerate propagation results"
            );
        }

        let pseudoinverse = na_matrix
            .pseudo_inverse(1e-12)
            .map(|pinv| Matrix::from_nalgebra(&pinv))
            .unwrap_or_else(|_| {
                tracing::warn!("SVD-based pseudoinverse failed to converge; falling back to the identity");
                Matrix::identity(n)
            });

        Propagation::Original { pseudoinverse, omega }
    }

    /// Build the `Neighbors` variant: only `W̃` is needed.
    pub fn neighbors(graph: &WeightedEdgeGraph, omega: ScalarFunction) -> Self {
        Propagation::Neighbors {
            w_tilde: normalized_transposed_adjacency(graph),
            omega,
        }
    }

    /// Build the `Custom` variant, structurally identical to `neighbors`.
    pub fn custom(graph: &WeightedEdgeGraph, omega: ScalarFunction) -> Self {
        Propagation::Custom {
            w_tilde: normalized_transposed_adjacency(graph),
            omega,
        }
    }

    pub fn apply(&self, x: &[f64], t: f64) -> Vec<f64> {
        match self {
            Propagation::Original { pseudoinverse, omega } => {
                let scale = omega.eval(t);
                pseudoinverse
                    .mul_vector(x)
                    .expect("pseudoinverse was built from a graph of the same node count as x")
                    .into_iter()
                    .map(|v| v * scale)
                    .collect()
            }
            Propagation::Neighbors { w_tilde, omega } | Propagation::Custom { w_tilde, omega } => {
                let scale = omega.eval(t);
                let w_x = w_tilde.mul_vector(x).expect("w_tilde was built from a graph of the same node count as x");
                x.iter().zip(&w_x).map(|(xi, wi)| xi + scale * wi).collect()
            }
        }
    }

    /// The Original variant has no separate "delta term" distinct from its
    /// resolved state — it is the closed-form solution of the underlying
    /// linear system, matching `original_source`'s `propagationTerm`, which
    /// returns the same expression as `propagate`.
    pub fn term(&self, x: &[f64], t: f64) -> Vec<f64> {
        match self {
            Propagation::Original { .. } => self.apply(x, t),
            Propagation::Neighbors { w_tilde, omega } | Propagation::Custom { w_tilde, omega } => {
                let scale = omega.eval(t);
                let w_x = w_tilde.mul_vector(x).expect("w_tilde was built from a graph of the same node count as x");
                w_x.into_iter().map(|wi| scale * wi).collect()
            }
        }
    }
}

/// Which [`Propagation`] variant to build, paired with its `omega`, without
/// the graph it is built from.
///
/// `Propagation`'s `W̃` (and, for `Original`, its pseudoinverse) is baked in
/// at construction time from whatever graph is passed to `neighbors`/
/// `original`/`custom` — nothing checks that graph is the same one the
/// agent's state vectors are sized against. `PropagationKind` exists so a
/// caller assembling an agent names only the *kind* of propagation it wants;
/// the agent builds the operator from its own `augmented_graph`, so the two
/// can never diverge.
#[derive(Clone, Debug)]
pub enum PropagationKind {
    Original(ScalarFunction),
    Neighbors(ScalarFunction),
    Custom(ScalarFunction),
}

impl PropagationKind {
    /// Build the named [`Propagation`] variant from `graph`.
    pub fn build(self, graph: &WeightedEdgeGraph) -> Propagation {
        match self {
            PropagationKind::Original(omega) => Propagation::original(graph, omega),
            PropagationKind::Neighbors(omega) => Propagation::neighbors(graph, omega),
            PropagationKind::Custom(omega) => Propagation::custom(graph, omega),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_graph() -> WeightedEdgeGraph {
        let mut g = WeightedEdgeGraph::with_node_count(3);
        g.add_edge(0, 1, 1.0, true).unwrap();
        g.add_edge(1, 2, 1.0, true).unwrap();
        g
    }

    #[test]
    fn neighbors_apply_matches_closed_form() {
        let g = chain_graph();
        let p = Propagation::neighbors(&g, ScalarFunction::Constant(1.0));
        let x = vec![1.0, 1.0, 1.0];
        let out = p.apply(&x, 0.0);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn custom_is_structurally_identical_to_neighbors() {
        let g = chain_graph();
        let a = Propagation::neighbors(&g, ScalarFunction::Constant(0.5));
        let b = Propagation::custom(&g, ScalarFunction::Constant(0.5));
        let x = vec![1.0, 2.0, 3.0];
        assert_eq!(a.apply(&x, 1.0), b.apply(&x, 1.0));
    }

    #[test]
    fn original_builds_without_panicking_on_singular_graph() {
        // An isolated node with no edges: W~ is all zero, so I - W~ = I,
        // which is invertible. Use a disconnected pair to test the
        // non-trivial but still well-posed case.
        let g = WeightedEdgeGraph::with_node_count(2);
        let p = Propagation::original(&g, ScalarFunction::Constant(1.0));
        let x = vec![1.0, 2.0];
        let out = p.apply(&x, 0.0);
        assert_eq!(out.len(), 2);
    }
}
