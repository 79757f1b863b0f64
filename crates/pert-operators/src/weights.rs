//! Shared adjacency-normalisation helper used by every propagation variant
//! (spec.md §4.4): the column-normalised transpose of a graph's weighted
//! adjacency matrix.

use pert_graph::WeightedEdgeGraph;
use pert_matrix::Matrix;

/// Compute `W̃`: the transpose of `graph`'s adjacency matrix, with each
/// column `j` divided by `Σᵢ |W̃ᵢⱼ| + 1e-20`.
///
/// Note that column `j` of the transpose is row `j` of the original
/// adjacency matrix, so the normalisation factor for column `j` is the
/// absolute row-sum of row `j` in the un-transposed graph — this mirrors
/// `original_source/src/computation/PropagationModelOriginal.cxx`, which
/// computes `normalizationFactors[i]` by summing `|getEdgeWeight(i, j)|`
/// over `j` before transposing.
pub fn normalized_transposed_adjacency(graph: &WeightedEdgeGraph) -> Matrix {
    let n = graph.num_nodes();
    let adjacency = graph.adjacency_matrix();
    let mut row_abs_sums = vec![0.0; n];
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..n {
            sum += adjacency.get(i, j).expect("in bounds").abs();
        }
        row_abs_sums[i] = sum;
    }

    let mut transposed = adjacency.transpose();
    transposed
        .normalize_by_vector_column(&row_abs_sums)
        .expect("row_abs_sums has exactly n entries, matching transposed's column count");
    transposed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_columns_to_unit_abs_sum() {
        let mut g = WeightedEdgeGraph::with_node_count(2);
        g.add_edge(0, 1, 2.0, true).unwrap();
        g.add_edge(1, 0, 4.0, true).unwrap();
        let w_tilde = normalized_transposed_adjacency(&g);
        // row 0's abs sum is 2.0 (edge 0->1); column 0 of the transpose is
        // row 0 of the original, i.e. [0, 2.0], divided by 2.0 -> [0, 1.0].
        assert!((w_tilde.get(1, 0).unwrap() - 1.0).abs() < 1e-9);
        // row 1's abs sum is 4.0 (edge 1->0); column 1 of the transpose is
        // row 1 of the original, i.e. [4.0, 0], divided by 4.0 -> [1.0, 0].
        assert!((w_tilde.get(0, 1).unwrap() - 1.0).abs() < 1e-9);
    }
}
