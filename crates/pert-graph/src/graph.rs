//! [`WeightedEdgeGraph`]: a directed, weighted graph whose adjacency matrix,
//! edge list, and name index are kept synchronized by every mutator
//! (spec.md §3, §4.2).
//!
//! Nodes and edges may only be *added* — there is no node or edge removal,
//! matching the original implementation's append-only lifecycle
//! (`original_source/src/data_structures/WeightedEdgeGraph.hxx`). This
//! simplifies the invariant story considerably: once a name is assigned an
//! index, that binding never changes, so callers may cache indices across
//! a sequence of reads as long as no intervening call adds nodes.

use rustc_hash::{FxHashMap, FxHashSet};

use pert_matrix::Matrix;

use crate::error::{GraphError, GraphResult};

/// Below this magnitude, an adjacency-matrix entry is treated as "no edge"
/// when constructing a graph from a matrix (spec.md §4.2).
pub const EDGE_TOLERANCE: f64 = 1e-10;

/// A directed, weighted graph with a synchronized dense adjacency matrix.
///
/// Invariants maintained by every public mutator (spec.md §3):
/// - `name_vector[i]` is the inverse of `name_map`, and
///   `|name_map| == num_nodes() == node_values.len() == adj_matrix.rows() == adj_matrix.cols()`;
/// - an edge `(s, d, w)` appears in `edges_vector` iff `d ∈ out_adj[s]` iff
///   `adj_matrix[(s, d)] == w != 0`;
/// - node names are unique.
#[derive(Clone, Debug)]
pub struct WeightedEdgeGraph {
    node_values: Vec<f64>,
    name_vector: Vec<String>,
    name_map: FxHashMap<String, usize>,
    out_adj: Vec<FxHashSet<usize>>,
    in_adj: Vec<FxHashSet<usize>>,
    edges_vector: Vec<(usize, usize, f64)>,
    adj_matrix: Matrix,
}

impl WeightedEdgeGraph {
    // ── Construction ────────────────────────────────────────────────────────

    /// An empty graph (zero nodes, zero edges).
    pub fn empty() -> Self {
        Self {
            node_values: Vec::new(),
            name_vector: Vec::new(),
            name_map: FxHashMap::default(),
            out_adj: Vec::new(),
            in_adj: Vec::new(),
            edges_vector: Vec::new(),
            adj_matrix: Matrix::zeros(0, 0),
        }
    }

    /// `n` nodes auto-named `"0".."n-1"`, zero edges.
    pub fn with_node_count(n: usize) -> Self {
        let names: Vec<String> = (0..n).map(|i| i.to_string()).collect();
        Self::with_names(&names).expect("auto-generated names are always unique")
    }

    /// `names.len()` nodes with the given names, all values zero.
    pub fn with_names(names: &[String]) -> GraphResult<Self> {
        let values = vec![0.0; names.len()];
        Self::with_names_and_values(names, &values)
    }

    /// `names.len()` nodes with the given names and values. Fails if the two
    /// slices differ in length.
    pub fn with_names_and_values(names: &[String], values: &[f64]) -> GraphResult<Self> {
        if names.len() != values.len() {
            return Err(GraphError::NameValueLengthMismatch {
                names: names.len(),
                values: values.len(),
            });
        }
        let mut name_map = FxHashMap::default();
        for (i, name) in names.iter().enumerate() {
            if name_map.insert(name.clone(), i).is_some() {
                return Err(GraphError::DuplicateNode(name.clone()));
            }
        }
        let n = names.len();
        Ok(Self {
            node_values: values.to_vec(),
            name_vector: names.to_vec(),
            name_map,
            out_adj: vec![FxHashSet::default(); n],
            in_adj: vec![FxHashSet::default(); n],
            edges_vector: Vec::new(),
            adj_matrix: Matrix::zeros(n, n),
        })
    }

    /// Build a graph from a square adjacency matrix: one auto-named node per
    /// row, and a directed edge for every entry whose magnitude exceeds
    /// [`EDGE_TOLERANCE`]. Fails if the matrix is not square.
    pub fn from_adjacency_matrix(m: &Matrix) -> GraphResult<Self> {
        if m.rows() != m.cols() {
            return Err(GraphError::NonSquareAdjacency {
                rows: m.rows(),
                cols: m.cols(),
            });
        }
        let n = m.rows();
        let mut graph = Self::with_node_count(n);
        for i in 0..n {
            for j in 0..n {
                let w = m.get(i, j).expect("in-bounds by construction");
                if w.abs() > EDGE_TOLERANCE {
                    graph
                        .add_edge(i, j, w, true)
                        .expect("indices derived from the matrix's own dimensions are in range");
                }
            }
        }
        Ok(graph)
    }

    // ── Dimensions & lookups ────────────────────────────────────────────────

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.name_vector.len()
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges_vector.len()
    }

    pub fn name_of(&self, index: usize) -> GraphResult<&str> {
        self.name_vector
            .get(index)
            .map(String::as_str)
            .ok_or(GraphError::IndexOutOfRange(index, self.num_nodes()))
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_map.get(name).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.name_vector
    }

    pub fn node_value(&self, index: usize) -> GraphResult<f64> {
        self.node_values
            .get(index)
            .copied()
            .ok_or(GraphError::IndexOutOfRange(index, self.num_nodes()))
    }

    pub fn set_node_value(&mut self, index: usize, value: f64) -> GraphResult<()> {
        let n = self.num_nodes();
        let slot = self.node_values.get_mut(index).ok_or(GraphError::IndexOutOfRange(index, n))?;
        *slot = value;
        Ok(())
    }

    pub fn node_values(&self) -> &[f64] {
        &self.node_values
    }

    pub fn edges(&self) -> &[(usize, usize, f64)] {
        &self.edges_vector
    }

    pub fn adjacency_matrix(&self) -> &Matrix {
        &self.adj_matrix
    }

    fn check_index(&self, i: usize) -> GraphResult<()> {
        if i < self.num_nodes() {
            Ok(())
        } else {
            Err(GraphError::IndexOutOfRange(i, self.num_nodes()))
        }
    }

    // ── Node mutation ───────────────────────────────────────────────────────

    /// Add one node, auto-named by its index, with the given value.
    pub fn add_node(&mut self, value: f64) -> GraphResult<usize> {
        let name = self.num_nodes().to_string();
        self.add_named_node(&name, value)
    }

    /// Add one node with an explicit name. Fails if the name is already
    /// taken; the graph is left unchanged on failure.
    pub fn add_named_node(&mut self, name: &str, value: f64) -> GraphResult<usize> {
        if self.name_map.contains_key(name) {
            return Err(GraphError::DuplicateNode(name.to_string()));
        }
        let index = self.num_nodes();
        self.name_vector.push(name.to_string());
        self.name_map.insert(name.to_string(), index);
        self.node_values.push(value);
        self.out_adj.push(FxHashSet::default());
        self.in_adj.push(FxHashSet::default());
        self.adj_matrix = self.adj_matrix.copy_and_add_rows_cols_with_zeros(1, 1);
        Ok(index)
    }

    /// Add `names.len()` nodes at once. `values` must be empty (all zeros),
    /// the same length as `names` (paired), or any other length (an error).
    /// All-or-nothing: if any name collides with an existing or sibling
    /// name, no nodes are added.
    pub fn add_nodes(&mut self, names: &[String], values: &[f64]) -> GraphResult<Vec<usize>> {
        let resolved_values: Vec<f64> = if values.is_empty() {
            vec![0.0; names.len()]
        } else if values.len() == names.len() {
            values.to_vec()
        } else {
            return Err(GraphError::NameValueLengthMismatch {
                names: names.len(),
                values: values.len(),
            });
        };

        // Validate before mutating anything, for atomicity.
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for name in names {
            if self.name_map.contains_key(name) || !seen.insert(name.as_str()) {
                return Err(GraphError::DuplicateNode(name.clone()));
            }
        }

        let mut indices = Vec::with_capacity(names.len());
        for (name, value) in names.iter().zip(resolved_values) {
            indices.push(
                self.add_named_node(name, value)
                    .expect("uniqueness already validated above"),
            );
        }
        Ok(indices)
    }

    // ── Edge mutation ────────────────────────────────────────────────────────

    /// Add a directed edge `src -> dst` with weight `w`. When `directed` is
    /// `false`, also adds `dst -> src` with the same weight. Re-adding an
    /// existing edge updates its weight in place.
    pub fn add_edge(&mut self, src: usize, dst: usize, w: f64, directed: bool) -> GraphResult<()> {
        self.check_index(src)?;
        self.check_index(dst)?;
        self.insert_directed_edge(src, dst, w);
        if !directed {
            self.insert_directed_edge(dst, src, w);
        }
        Ok(())
    }

    /// Add an edge by node name; both names must already exist.
    pub fn add_edge_by_name(&mut self, src: &str, dst: &str, w: f64, directed: bool) -> GraphResult<()> {
        let si = self.index_of(src).ok_or_else(|| GraphError::NodeNotFound(src.to_string()))?;
        let di = self.index_of(dst).ok_or_else(|| GraphError::NodeNotFound(dst.to_string()))?;
        self.add_edge(si, di, w, directed)
    }

    fn insert_directed_edge(&mut self, src: usize, dst: usize, w: f64) {
        let is_new = self.out_adj[src].insert(dst);
        self.in_adj[dst].insert(src);
        self.adj_matrix.set(src, dst, w).expect("bounds checked by caller");
        if is_new {
            self.edges_vector.push((src, dst, w));
        } else if let Some(entry) = self
            .edges_vector
            .iter_mut()
            .find(|(s, d, _)| *s == src && *d == dst)
        {
            entry.2 = w;
        }
    }

    pub fn edge_weight(&self, src: usize, dst: usize) -> GraphResult<f64> {
        self.check_index(src)?;
        self.check_index(dst)?;
        self.adj_matrix.get(src, dst).map_err(|_| GraphError::IndexOutOfRange(src, self.num_nodes()))
    }

    // ── Neighbourhood queries ────────────────────────────────────────────────

    pub fn out_degree(&self, i: usize) -> GraphResult<usize> {
        self.check_index(i)?;
        Ok(self.out_adj[i].len())
    }

    pub fn in_degree(&self, i: usize) -> GraphResult<usize> {
        self.check_index(i)?;
        Ok(self.in_adj[i].len())
    }

    pub fn degree(&self, i: usize) -> GraphResult<usize> {
        Ok(self.out_degree(i)? + self.in_degree(i)?)
    }

    pub fn successors(&self, i: usize) -> GraphResult<Vec<usize>> {
        self.check_index(i)?;
        let mut v: Vec<usize> = self.out_adj[i].iter().copied().collect();
        v.sort_unstable();
        Ok(v)
    }

    pub fn predecessors(&self, i: usize) -> GraphResult<Vec<usize>> {
        self.check_index(i)?;
        let mut v: Vec<usize> = self.in_adj[i].iter().copied().collect();
        v.sort_unstable();
        Ok(v)
    }

    /// Union of predecessors and successors, deduplicated.
    pub fn neighbors(&self, i: usize) -> GraphResult<Vec<usize>> {
        self.check_index(i)?;
        let mut set: FxHashSet<usize> = self.out_adj[i].clone();
        set.extend(self.in_adj[i].iter().copied());
        let mut v: Vec<usize> = set.into_iter().collect();
        v.sort_unstable();
        Ok(v)
    }

    /// True iff at least one of `a -> b` or `b -> a` exists.
    pub fn adjacent(&self, a: usize, b: usize) -> GraphResult<bool> {
        self.check_index(a)?;
        self.check_index(b)?;
        Ok(self.out_adj[a].contains(&b) || self.out_adj[b].contains(&a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_graph_has_no_nodes() {
        let g = WeightedEdgeGraph::empty();
        assert_eq!(g.num_nodes(), 0);
        assert_eq!(g.num_edges(), 0);
    }

    #[test]
    fn with_node_count_auto_names() {
        let g = WeightedEdgeGraph::with_node_count(3);
        assert_eq!(g.names(), &["0".to_string(), "1".to_string(), "2".to_string()]);
    }

    #[test]
    fn duplicate_name_rejected() {
        let names = vec!["a".to_string(), "a".to_string()];
        assert!(WeightedEdgeGraph::with_names(&names).is_err());
    }

    #[test]
    fn name_value_length_mismatch_rejected() {
        let names = vec!["a".to_string(), "b".to_string()];
        let values = vec![1.0];
        assert!(WeightedEdgeGraph::with_names_and_values(&names, &values).is_err());
    }

    #[test]
    fn add_edge_updates_all_three_views() {
        let mut g = WeightedEdgeGraph::with_node_count(3);
        g.add_edge(0, 1, 2.5, true).unwrap();
        assert!(g.out_adj_contains(0, 1));
        assert_eq!(g.edge_weight(0, 1).unwrap(), 2.5);
        assert_eq!(g.edges(), &[(0, 1, 2.5)]);
        assert_eq!(g.num_edges(), 1);
    }

    #[test]
    fn undirected_edge_adds_both_directions() {
        let mut g = WeightedEdgeGraph::with_node_count(2);
        g.add_edge(0, 1, 1.0, false).unwrap();
        assert_eq!(g.edge_weight(0, 1).unwrap(), 1.0);
        assert_eq!(g.edge_weight(1, 0).unwrap(), 1.0);
        assert_eq!(g.num_edges(), 2);
    }

    #[test]
    fn re_adding_edge_updates_weight_not_count() {
        let mut g = WeightedEdgeGraph::with_node_count(2);
        g.add_edge(0, 1, 1.0, true).unwrap();
        g.add_edge(0, 1, 9.0, true).unwrap();
        assert_eq!(g.num_edges(), 1);
        assert_eq!(g.edge_weight(0, 1).unwrap(), 9.0);
    }

    #[test]
    fn add_node_grows_adjacency_matrix_preserving_prefix() {
        let mut g = WeightedEdgeGraph::with_node_count(2);
        g.add_edge(0, 1, 3.0, true).unwrap();
        g.add_node(0.0).unwrap();
        assert_eq!(g.num_nodes(), 3);
        assert_eq!(g.adjacency_matrix().rows(), 3);
        assert_eq!(g.edge_weight(0, 1).unwrap(), 3.0);
    }

    #[test]
    fn add_nodes_three_shapes() {
        let mut g = WeightedEdgeGraph::empty();
        g.add_nodes(&["a".to_string(), "b".to_string()], &[]).unwrap();
        assert_eq!(g.node_values(), &[0.0, 0.0]);

        let mut g2 = WeightedEdgeGraph::empty();
        g2.add_nodes(&["a".to_string(), "b".to_string()], &[1.0, 2.0]).unwrap();
        assert_eq!(g2.node_values(), &[1.0, 2.0]);

        let mut g3 = WeightedEdgeGraph::empty();
        assert!(g3.add_nodes(&["a".to_string(), "b".to_string()], &[1.0]).is_err());
    }

    #[test]
    fn add_nodes_is_atomic_on_collision() {
        let mut g = WeightedEdgeGraph::with_names(&["a".to_string()]).unwrap();
        let result = g.add_nodes(&["b".to_string(), "a".to_string()], &[]);
        assert!(result.is_err());
        assert_eq!(g.num_nodes(), 1, "no node should have been added on a partial collision");
    }

    #[test]
    fn from_adjacency_matrix_respects_tolerance() {
        let m = Matrix::from_rows(vec![vec![0.0, 1e-12], vec![2.0, 0.0]]).unwrap();
        let g = WeightedEdgeGraph::from_adjacency_matrix(&m).unwrap();
        assert_eq!(g.num_edges(), 1);
        assert_eq!(g.edge_weight(1, 0).unwrap(), 2.0);
    }

    #[test]
    fn from_non_square_matrix_fails() {
        let m = Matrix::zeros(2, 3);
        assert!(WeightedEdgeGraph::from_adjacency_matrix(&m).is_err());
    }

    #[test]
    fn neighbors_is_union_of_predecessors_and_successors() {
        let mut g = WeightedEdgeGraph::with_node_count(3);
        g.add_edge(0, 1, 1.0, true).unwrap();
        g.add_edge(2, 1, 1.0, true).unwrap();
        let mut n = g.neighbors(1).unwrap();
        n.sort_unstable();
        assert_eq!(n, vec![0, 2]);
    }

    #[test]
    fn adjacent_is_true_in_either_direction() {
        let mut g = WeightedEdgeGraph::with_node_count(2);
        g.add_edge(0, 1, 1.0, true).unwrap();
        assert!(g.adjacent(0, 1).unwrap());
        assert!(g.adjacent(1, 0).unwrap());
    }

    impl WeightedEdgeGraph {
        fn out_adj_contains(&self, i: usize, j: usize) -> bool {
            self.out_adj[i].contains(&j)
        }
    }
}
