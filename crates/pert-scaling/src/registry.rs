//! Per-node scaling-function registry: the bridge between a parsed
//! parameter file and the [`ScalarFunction`] each node in a graph evaluates
//! at a given time (spec.md §4.3).

use rustc_hash::FxHashMap;

use crate::function::{ScalarFunction, StepFunction};
use crate::param_file::{parse_param_file, ParamRow};

/// Maps node names to their scaling curve, falling back to a default curve
/// for any node not named in the backing parameter file.
#[derive(Clone, Debug)]
pub struct ScalingRegistry {
    default: ScalarFunction,
    per_node: FxHashMap<String, ScalarFunction>,
}

impl ScalingRegistry {
    /// A registry with no per-node overrides: every node evaluates to the
    /// constant `0.5` (spec.md §4.3, "when no file at all is provided").
    pub fn constant_default() -> Self {
        Self {
            default: ScalarFunction::default(),
            per_node: FxHashMap::default(),
        }
    }

    /// Build a registry from already-parsed parameter rows, restricted to
    /// `known_nodes`. A row naming a node absent from `known_nodes` is kept
    /// out of the registry and logged — it does not fail the build (spec.md
    /// §4.3: "names absent from the ordered-node list are ignored with a
    /// warning").
    ///
    /// A row supplying exactly three parameters becomes a [`StepFunction`];
    /// any other parameter count is logged and the node falls back to the
    /// registry's default curve instead.
    pub fn from_rows(rows: Vec<ParamRow>, known_nodes: &[String]) -> Self {
        let known: std::collections::HashSet<&str> = known_nodes.iter().map(String::as_str).collect();
        let mut per_node = FxHashMap::default();
        for row in rows {
            if !known.contains(row.name.as_str()) {
                tracing::warn!(node = %row.name, "scaling parameter file names a node absent from the graph, ignoring");
                continue;
            }
            match row.parameters.as_slice() {
                [p0, p1, p2] => {
                    per_node.insert(row.name, ScalarFunction::Step(StepFunction::new(*p0, *p1, *p2)));
                }
                other => {
                    tracing::warn!(
                        node = %row.name,
                        count = other.len(),
                        "expected exactly 3 scaling parameters (p0, p1, p2), falling back to the default curve"
                    );
                }
            }
        }
        Self {
            default: ScalarFunction::default(),
            per_node,
        }
    }

    /// Parse a TSV parameter file's contents and build a registry scoped to
    /// `known_nodes`.
    pub fn from_tsv(contents: &str, known_nodes: &[String]) -> crate::error::ScalingResult<Self> {
        let rows = parse_param_file(contents)?;
        Ok(Self::from_rows(rows, known_nodes))
    }

    /// Evaluate the scaling function for `node` at time `t`, falling back to
    /// the default curve if `node` has no override.
    pub fn eval(&self, node: &str, t: f64) -> f64 {
        self.per_node.get(node).unwrap_or(&self.default).eval(t)
    }

    /// Evaluate `eval` for every name in `node_names`, in order — the
    /// "vectorised form" of spec.md §4.3.
    pub fn eval_vector(&self, node_names: &[String], t: f64) -> Vec<f64> {
        node_names.iter().map(|name| self.eval(name, t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes() -> Vec<String> {
        vec!["A".to_string(), "B".to_string()]
    }

    #[test]
    fn unknown_node_uses_default() {
        let r = ScalingRegistry::constant_default();
        assert_eq!(r.eval("anything", 42.0), 0.5);
    }

    #[test]
    fn per_node_override_from_rows() {
        let rows = vec![ParamRow {
            name: "A".to_string(),
            parameters: vec![1.0, 2.0, 3.0],
        }];
        let r = ScalingRegistry::from_rows(rows, &nodes());
        assert_eq!(r.eval("A", 0.0), 1.0);
        assert_eq!(r.eval("A", 5.5), 2.0);
        assert_eq!(r.eval("A", 100.0), 3.0);
        assert_eq!(r.eval("B", 0.0), 0.5, "B has no override, falls back to default");
    }

    #[test]
    fn unknown_node_name_in_file_is_ignored() {
        let rows = vec![ParamRow {
            name: "ghost".to_string(),
            parameters: vec![1.0, 2.0, 3.0],
        }];
        let r = ScalingRegistry::from_rows(rows, &nodes());
        assert_eq!(r.eval("ghost", 0.0), 0.5);
    }

    #[test]
    fn wrong_parameter_count_falls_back_to_default() {
        let rows = vec![ParamRow {
            name: "A".to_string(),
            parameters: vec![1.0, 2.0],
        }];
        let r = ScalingRegistry::from_rows(rows, &nodes());
        assert_eq!(r.eval("A", 0.0), 0.5);
    }

    #[test]
    fn eval_vector_preserves_order() {
        let r = ScalingRegistry::constant_default();
        let names = vec!["x".to_string(), "y".to_string(), "z".to_string()];
        assert_eq!(r.eval_vector(&names, 1.0), vec![0.5, 0.5, 0.5]);
    }
}
