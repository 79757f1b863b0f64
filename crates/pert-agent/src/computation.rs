//! [`Computation`]: one agent's augmented state and the perturbation kernel
//! that advances it (spec.md §3 "Agent state", §4.5).

use std::sync::Arc;

use pert_core::AgentRng;
use pert_graph::WeightedEdgeGraph;
use pert_matrix::Matrix;
use pert_operators::{normalized_transposed_adjacency, Conservation, Dissipation, Propagation, PropagationKind};
use pert_scaling::SaturationFunction;

use crate::error::{AgentError, AgentResult};

/// Prefix identifying a virtual-output node by name, without going through
/// the full `VirtualNodeName` parser — used only for the cheap membership
/// test in [`Computation::reset_virtual_outputs`].
const VIRTUAL_OUT_PREFIX: &str = "v-out:";

/// One agent's full state: its (possibly shared) un-augmented graph, its
/// owned augmented graph, the three state vectors, and the operators that
/// advance them.
pub struct Computation {
    local_type: String,
    graph: Arc<WeightedEdgeGraph>,
    augmented_graph: WeightedEdgeGraph,

    input: Vec<f64>,
    input_augmented: Vec<f64>,
    output_augmented: Vec<f64>,

    /// Column-normalised transposed adjacency of the augmented graph — the
    /// `W*` conservation needs. Cached here because rebuilding it every
    /// `perturb` call would repeat O(n^2) work for a value that only
    /// changes when the augmented edge set changes (spec.md §4.6).
    w_star: Matrix,

    dissipation: Dissipation,
    conservation: Conservation,
    propagation: Propagation,
    saturation: Option<(SaturationFunction, f64)>,
    conservation_weights: Option<Vec<f64>>,

    rng: AgentRng,
    initial_input_norm: f64,
    caches_initialized: bool,
}

impl Computation {
    /// Construct a new agent. `initial_input` must have exactly
    /// `graph.num_nodes()` entries; `augmented_graph` must already include
    /// `graph` as its top-left block (the caller builds it via
    /// `crate::augmentation`).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        local_type: impl Into<String>,
        graph: Arc<WeightedEdgeGraph>,
        augmented_graph: WeightedEdgeGraph,
        initial_input: Vec<f64>,
        dissipation: Dissipation,
        conservation: Conservation,
        propagation: Propagation,
        saturation: Option<(SaturationFunction, f64)>,
        conservation_weights: Option<Vec<f64>>,
        rng: AgentRng,
    ) -> AgentResult<Self> {
        if initial_input.len() != graph.num_nodes() {
            return Err(AgentError::InputLengthMismatch {
                got: initial_input.len(),
                expected: graph.num_nodes(),
            });
        }

        let initial_input_norm = initial_input.iter().map(|v| v * v).sum::<f64>().sqrt();

        let mut input_augmented = vec![0.0; augmented_graph.num_nodes()];
        input_augmented[..initial_input.len()].copy_from_slice(&initial_input);

        let w_star = normalized_transposed_adjacency(&augmented_graph);

        Ok(Self {
            local_type: local_type.into(),
            graph,
            augmented_graph,
            input: initial_input,
            input_augmented,
            output_augmented: Vec::new(),
            w_star,
            dissipation,
            conservation,
            propagation,
            saturation,
            conservation_weights,
            rng,
            initial_input_norm,
            caches_initialized: true,
        })
    }

    /// Construct a new agent the same way as [`Self::new`], except the
    /// propagation operator is built from `augmented_graph` itself rather
    /// than accepted as an already-built [`Propagation`].
    ///
    /// `Propagation`'s `W̃` is baked in at construction time from whichever
    /// graph it is built from, with nothing to check that graph matches the
    /// one the agent's state vectors are sized against; passing a
    /// `PropagationKind` instead removes the chance of the two silently
    /// diverging.
    #[allow(clippy::too_many_arguments)]
    pub fn with_propagation_kind(
        local_type: impl Into<String>,
        graph: Arc<WeightedEdgeGraph>,
        augmented_graph: WeightedEdgeGraph,
        initial_input: Vec<f64>,
        dissipation: Dissipation,
        conservation: Conservation,
        propagation_kind: PropagationKind,
        saturation: Option<(SaturationFunction, f64)>,
        conservation_weights: Option<Vec<f64>>,
        rng: AgentRng,
    ) -> AgentResult<Self> {
        let propagation = propagation_kind.build(&augmented_graph);
        Self::new(
            local_type,
            graph,
            augmented_graph,
            initial_input,
            dissipation,
            conservation,
            propagation,
            saturation,
            conservation_weights,
            rng,
        )
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn local_type(&self) -> &str {
        &self.local_type
    }

    pub fn graph(&self) -> &WeightedEdgeGraph {
        &self.graph
    }

    pub fn augmented_graph(&self) -> &WeightedEdgeGraph {
        &self.augmented_graph
    }

    pub fn input(&self) -> &[f64] {
        &self.input
    }

    pub fn input_augmented(&self) -> &[f64] {
        &self.input_augmented
    }

    pub fn output_augmented(&self) -> &[f64] {
        &self.output_augmented
    }

    pub fn caches_initialized(&self) -> bool {
        self.caches_initialized
    }

    // ── Perturbation kernel (spec.md §4.5) ───────────────────────────────────

    /// Run one intra-step update: dissipate, conserve, propagate, saturate.
    /// The order is part of the contract and must not be reordered.
    pub fn perturb(&mut self, t: f64) -> AgentResult<()> {
        let dissipated = self.dissipation.apply(&self.input_augmented, t, &mut self.rng);
        let conserved = self.conservation.apply(
            &self.input_augmented,
            &dissipated,
            &self.w_star,
            t,
            self.conservation_weights.as_deref(),
        )?;
        let propagated = self.propagation.apply(&conserved, t);
        let saturated = match &self.saturation {
            Some((f, limit)) => f.apply_vector(&propagated, *limit),
            None => propagated,
        };
        self.output_augmented = saturated;
        Ok(())
    }

    /// Copy `output_augmented` into `input_augmented` (and refresh the
    /// un-augmented `input` view from its prefix), optionally rescaling so
    /// the copy's L2 norm matches the *original, pre-augmentation* input's
    /// norm ("conserve-initial-norm" mode, spec.md §4.5/§9).
    pub fn update_input(&mut self, conserve_initial_norm: bool) -> AgentResult<()> {
        if self.output_augmented.len() != self.augmented_graph.num_nodes() {
            return Err(AgentError::Uninitialized);
        }

        let mut next = self.output_augmented.clone();
        if conserve_initial_norm {
            let norm: f64 = next.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                let scale = self.initial_input_norm / norm;
                for v in next.iter_mut() {
                    *v *= scale;
                }
            }
        }

        self.input = next[..self.graph.num_nodes()].to_vec();
        self.input_augmented = next;
        Ok(())
    }

    /// Zero the entries of `output_augmented` at virtual-*output* node
    /// indices, leaving virtual-input entries untouched (spec.md §4.8,
    /// `resetVirtualOutputs`).
    pub fn reset_virtual_outputs(&mut self) {
        if self.output_augmented.is_empty() {
            return;
        }
        for (i, name) in self.augmented_graph.names().iter().enumerate() {
            if name.starts_with(VIRTUAL_OUT_PREFIX) {
                self.output_augmented[i] = 0.0;
            }
        }
    }

    // ── Boundary getters/setters ─────────────────────────────────────────────

    /// Read the current value at a named virtual-output node, for packing
    /// into an outgoing exchange buffer.
    pub fn virtual_output(&self, name: &str) -> AgentResult<f64> {
        let idx = self
            .augmented_graph
            .index_of(name)
            .ok_or_else(|| AgentError::Graph(pert_graph::GraphError::NodeNotFound(name.to_string())))?;
        self.output_augmented
            .get(idx)
            .copied()
            .ok_or(AgentError::Uninitialized)
    }

    /// Write a delivered value into a named virtual-input node of
    /// `input_augmented`, as the boundary-exchange protocol's final step.
    pub fn set_virtual_input(&mut self, name: &str, value: f64) -> AgentResult<()> {
        self.set_input_augmented_value(name, value)
    }

    /// Rewrite a single named `input_augmented` entry from a checkpoint row.
    /// Unlike [`Self::set_virtual_input`] this is not restricted to
    /// virtual-node names — a checkpoint body covers every augmented node.
    pub fn restore_input_value(&mut self, name: &str, value: f64) -> AgentResult<()> {
        self.set_input_augmented_value(name, value)
    }

    fn set_input_augmented_value(&mut self, name: &str, value: f64) -> AgentResult<()> {
        let idx = self
            .augmented_graph
            .index_of(name)
            .ok_or_else(|| AgentError::Graph(pert_graph::GraphError::NodeNotFound(name.to_string())))?;
        self.input_augmented[idx] = value;
        Ok(())
    }
}
