//! [`Scheduler`]: the outer/inner driver loop (spec.md §4.9). Owns every
//! local agent's [`Computation`], runs checkpoint placement, the per-agent
//! perturb/update-input phases, output emission, and triggers the
//! boundary-exchange protocol at every outer boundary.

use rustc_hash::FxHashMap;
use tracing::warn;

use pert_agent::Computation;
use pert_checkpoint::CheckpointStore;
use pert_core::{InnerStep, OuterStep, Rank, SimClock, SimConfig};
use pert_exchange::{exchange_boundary, ContactMap, Transport};
use pert_partition::{ExchangePlan, PartitionPlan};

use crate::error::{SimError, SimResult};
use crate::observer::{NoopObserver, SimObserver};
use crate::output::OutputSink;

/// One worker's full driver state.
pub struct Scheduler<T: Transport> {
    config: SimConfig,
    own_rank: Rank,
    partition: PartitionPlan,
    exchange_plan: ExchangePlan,
    contact_map: ContactMap,
    transport: T,
    /// Local agents, in the order `partition.types_for_rank(own_rank)` lists
    /// them.
    agents: Vec<(String, Computation)>,
    checkpoint: CheckpointStore,
    clock: SimClock,
    output: Box<dyn OutputSink>,
    observer: Box<dyn SimObserver>,
}

impl<T: Transport> Scheduler<T> {
    /// Assemble a scheduler from its already-validated, already-partitioned
    /// parts. `agents` must be exactly the local agents for `own_rank`, one
    /// per entry of `partition.types_for_rank(own_rank)` (order does not
    /// need to match — this is checked, not assumed).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: SimConfig,
        own_rank: Rank,
        partition: PartitionPlan,
        exchange_plan: ExchangePlan,
        contact_map: ContactMap,
        transport: T,
        agents: Vec<(String, Computation)>,
        checkpoint: CheckpointStore,
        output: Box<dyn OutputSink>,
    ) -> SimResult<Self> {
        config.validate()?;

        let owned = partition.types_for_rank(own_rank);
        if agents.len() != owned.len() {
            return Err(SimError::AgentCountMismatch {
                expected: owned.len(),
                got: agents.len(),
                what: "local agents for this rank",
            });
        }
        for (type_name, _) in &agents {
            if !owned.contains(type_name) {
                return Err(SimError::AgentCountMismatch {
                    expected: owned.len(),
                    got: agents.len(),
                    what: "local agents for this rank (type not owned by this rank)",
                });
            }
        }

        let clock = SimClock::new(config.delta_t, config.inner_iterations);

        Ok(Self {
            config,
            own_rank,
            partition,
            exchange_plan,
            contact_map,
            transport,
            agents,
            checkpoint,
            clock,
            output,
            observer: Box::new(NoopObserver),
        })
    }

    pub fn with_observer(mut self, observer: Box<dyn SimObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Read-only access to this worker's local agents, keyed by type name.
    pub fn agents(&self) -> &[(String, Computation)] {
        &self.agents
    }

    /// Run from `(0, 0)`, or from the latest checkpoint if
    /// `config.resume_checkpoint` is set, through to
    /// `config.outer_iterations`.
    pub fn run(&mut self) -> SimResult<()> {
        let mut inner_start = 0;
        if self.config.resume_checkpoint {
            let (outer, inner) = self.resume()?;
            self.clock.outer = OuterStep(outer);
            self.clock.inner = InnerStep(inner);
            inner_start = inner;
        }

        self.observer.on_run_start(self.clock.outer, self.clock.inner);

        for outer in self.clock.outer.0..self.config.outer_iterations {
            self.observer.on_outer_start(OuterStep(outer));

            for inner in inner_start..self.config.inner_iterations {
                self.clock.outer = OuterStep(outer);
                self.clock.inner = InnerStep(inner);

                self.checkpoint_all(OuterStep(outer), InnerStep(inner))?;

                let t = self.clock.time();
                let flat_iteration = outer as u64 * self.config.inner_iterations as u64 + inner as u64;

                self.perturb_all(t)?;
                self.emit_all(flat_iteration, t)?;
                self.update_input_all()?;

                self.observer.on_inner_step(OuterStep(outer), InnerStep(inner));
            }
            inner_start = 0;

            self.exchange(OuterStep(outer))?;
            if self.config.reset_virtual_outputs {
                for (_, agent) in &mut self.agents {
                    agent.reset_virtual_outputs();
                }
            }

            self.observer.on_outer_end(OuterStep(outer));
        }

        self.output.finish()?;
        self.observer.on_sim_end(OuterStep(self.config.outer_iterations));
        Ok(())
    }

    // ── Per-phase helpers ────────────────────────────────────────────────────

    fn checkpoint_all(&self, outer: OuterStep, inner: InnerStep) -> SimResult<()> {
        for (type_name, agent) in &self.agents {
            self.checkpoint
                .save(type_name, outer.0, inner.0, agent.augmented_graph().names(), agent.input_augmented())?;
        }
        Ok(())
    }

    #[cfg(feature = "parallel")]
    fn perturb_all(&mut self, t: f64) -> SimResult<()> {
        use rayon::prelude::*;
        self.agents.par_iter_mut().try_for_each(|(type_name, agent)| {
            agent.perturb(t).map_err(|source| SimError::Agent { type_name: type_name.clone(), source })
        })
    }

    #[cfg(not(feature = "parallel"))]
    fn perturb_all(&mut self, t: f64) -> SimResult<()> {
        for (type_name, agent) in &mut self.agents {
            agent.perturb(t).map_err(|source| SimError::Agent { type_name: type_name.clone(), source })?;
        }
        Ok(())
    }

    #[cfg(feature = "parallel")]
    fn update_input_all(&mut self) -> SimResult<()> {
        use rayon::prelude::*;
        let conserve = self.config.conserve_initial_norm;
        self.agents.par_iter_mut().try_for_each(|(type_name, agent)| {
            agent.update_input(conserve).map_err(|source| SimError::Agent { type_name: type_name.clone(), source })
        })
    }

    #[cfg(not(feature = "parallel"))]
    fn update_input_all(&mut self) -> SimResult<()> {
        for (type_name, agent) in &mut self.agents {
            agent
                .update_input(self.config.conserve_initial_norm)
                .map_err(|source| SimError::Agent { type_name: type_name.clone(), source })?;
        }
        Ok(())
    }

    fn emit_all(&mut self, flat_iteration: u64, time: f64) -> SimResult<()> {
        for (type_name, agent) in &self.agents {
            self.output
                .emit(type_name, agent.augmented_graph().names(), agent.output_augmented(), flat_iteration, time)?;
        }
        Ok(())
    }

    /// Boundary exchange for one outer tick (spec.md §4.8). Packs from a
    /// precomputed snapshot of every local agent's virtual-output values
    /// (built before the call, so the pack/deliver closures never need to
    /// borrow `self.agents` concurrently with each other), then applies
    /// deliveries to every local agent that owns the named virtual-input
    /// node after the protocol completes.
    ///
    /// A virtual-node name is only ambiguous across local agents when two
    /// different locally-owned types both name the same peer type under
    /// `type` granularity; when that happens the value is delivered (or
    /// packed from) the most recently constructed owner, with a warning —
    /// the wire-level protocol has no further information to disambiguate.
    fn exchange(&mut self, outer: OuterStep) -> SimResult<()> {
        let pack_map = self.pack_map();
        let mut deliveries: Vec<(String, f64)> = Vec::new();

        exchange_boundary(
            self.own_rank,
            self.partition.num_ranks(),
            outer.0,
            self.config.delta_t,
            &self.exchange_plan,
            &self.contact_map,
            self.config.quantization,
            &mut self.transport,
            |name| *pack_map.get(name).unwrap_or(&0.0),
            |name, value| deliveries.push((name.to_string(), value)),
        )?;

        for (name, value) in deliveries {
            let mut delivered = false;
            for (type_name, agent) in &mut self.agents {
                if agent.augmented_graph().index_of(&name).is_some() {
                    agent
                        .set_virtual_input(&name, value)
                        .map_err(|source| SimError::Agent { type_name: type_name.clone(), source })?;
                    delivered = true;
                }
            }
            if !delivered {
                warn!(node = %name, rank = self.own_rank.0, "boundary delivery target not owned by any local agent");
            }
        }
        Ok(())
    }

    fn pack_map(&self) -> FxHashMap<String, f64> {
        let mut map = FxHashMap::default();
        for (_, agent) in &self.agents {
            for name in agent.augmented_graph().names() {
                if name.starts_with("v-out:") {
                    if let Ok(value) = agent.virtual_output(name) {
                        map.insert(name.clone(), value);
                    }
                }
            }
        }
        map
    }

    /// Restore every local agent from its latest checkpoint and return the
    /// `(outer, inner)` the run should resume from — the maximum across all
    /// local agents, since every local agent is checkpointed at the same
    /// `(outer, inner)` each inner step under normal operation.
    fn resume(&mut self) -> SimResult<(u32, u32)> {
        let mut resume_at = (0u32, 0u32);
        for (type_name, agent) in &mut self.agents {
            let (outer, inner, rows) = self.checkpoint.load_latest(type_name)?;
            for (name, value) in rows {
                agent
                    .restore_input_value(&name, value)
                    .map_err(|source| SimError::Agent { type_name: type_name.clone(), source })?;
            }
            resume_at = resume_at.max((outer, inner));
        }
        Ok(resume_at)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pert_core::{ContactEdge, QuantizationMode, TypeId, VirtualNodeGranularity};
    use pert_exchange::ChannelTransport;
    use pert_graph::WeightedEdgeGraph;
    use pert_operators::{Conservation, Dissipation, Propagation, PropagationKind};
    use pert_scaling::ScalarFunction;

    use crate::output::NullSink;

    use super::*;

    fn single_node_agent(type_name: &str, initial: f64) -> Computation {
        let graph = Arc::new(WeightedEdgeGraph::with_names(&[type_name.to_string()]).unwrap());
        let augmented = (*graph).clone();
        Computation::new(
            type_name,
            graph,
            augmented,
            vec![initial],
            Dissipation::Scaled(ScalarFunction::Constant(0.0)),
            Conservation::Scaled(ScalarFunction::Constant(0.0)),
            Propagation::neighbors(&WeightedEdgeGraph::with_node_count(1), ScalarFunction::Constant(0.0)),
            None,
            None,
            pert_core::AgentRng::new(1, TypeId(0)),
        )
        .unwrap()
    }

    fn scratch_dir(label: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("pert-sim-scheduler-test-{label}-{}", std::process::id()))
    }

    #[test]
    fn single_rank_run_advances_clock_to_completion() {
        let config = SimConfig { outer_iterations: 2, inner_iterations: 2, ..SimConfig::default() };
        let types = vec!["A".to_string()];
        let partition = PartitionPlan::new(&types, 1).unwrap();
        let plan = ExchangePlan::build(&[], &partition, VirtualNodeGranularity::Type, false);
        let contacts = ContactMap::build(&[], VirtualNodeGranularity::Type, false);
        let transport = ChannelTransport::fleet(1).pop().unwrap();
        let dir = scratch_dir("single-rank");
        let checkpoint = CheckpointStore::new(&dir).unwrap();

        let mut scheduler = Scheduler::new(
            config,
            Rank(0),
            partition,
            plan,
            contacts,
            transport,
            vec![("A".to_string(), single_node_agent("A", 1.0))],
            checkpoint,
            Box::new(NullSink),
        )
        .unwrap();

        scheduler.run().unwrap();
        assert_eq!(scheduler.clock().outer, OuterStep(2));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn mismatched_agent_count_is_rejected() {
        let config = SimConfig::default();
        let types = vec!["A".to_string(), "B".to_string()];
        let partition = PartitionPlan::new(&types, 1).unwrap();
        let plan = ExchangePlan::build(&[], &partition, VirtualNodeGranularity::Type, false);
        let contacts = ContactMap::build(&[], VirtualNodeGranularity::Type, false);
        let transport = ChannelTransport::fleet(1).pop().unwrap();
        let dir = scratch_dir("mismatch");
        let checkpoint = CheckpointStore::new(&dir).unwrap();

        let result = Scheduler::new(
            config,
            Rank(0),
            partition,
            plan,
            contacts,
            transport,
            vec![("A".to_string(), single_node_agent("A", 1.0))],
            checkpoint,
            Box::new(NullSink),
        );
        assert!(result.is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn two_rank_boundary_exchange_delivers_across_ranks() {
        let types = vec!["A".to_string(), "B".to_string()];
        let partition = PartitionPlan::new(&types, 2).unwrap();
        let edges = vec![ContactEdge {
            src_node: "A".to_string(),
            dst_node: "B".to_string(),
            src_type: "A".to_string(),
            dst_type: "B".to_string(),
            weight: 1.0,
            contact_times: vec![0.0],
        }];
        let plan = ExchangePlan::build(&edges, &partition, VirtualNodeGranularity::Type, false);
        let contacts = ContactMap::build(&edges, VirtualNodeGranularity::Type, false);

        let mut fleet = ChannelTransport::fleet(2);
        let t1 = fleet.pop().unwrap();
        let t0 = fleet.pop().unwrap();

        let config = SimConfig {
            outer_iterations: 1,
            inner_iterations: 1,
            quantization: QuantizationMode::Single,
            ..SimConfig::default()
        };

        let graph_a = Arc::new(WeightedEdgeGraph::with_names(&["A".to_string()]).unwrap());
        let mut augmented_a = (*graph_a).clone();
        augmented_a.add_named_node("v-out:B", 0.0).unwrap();
        augmented_a.add_edge(0, 1, 1.0, true).unwrap();
        let agent_a = Computation::with_propagation_kind(
            "A",
            graph_a,
            augmented_a,
            vec![1.0],
            Dissipation::Scaled(ScalarFunction::Constant(0.0)),
            Conservation::Scaled(ScalarFunction::Constant(0.0)),
            PropagationKind::Neighbors(ScalarFunction::Constant(1.0)),
            None,
            None,
            pert_core::AgentRng::new(1, TypeId(0)),
        )
        .unwrap();

        let graph_b = Arc::new(WeightedEdgeGraph::with_names(&["B".to_string()]).unwrap());
        let mut augmented_b = (*graph_b).clone();
        augmented_b.add_named_node("v-in:A", 0.0).unwrap();
        let agent_b = Computation::new(
            "B",
            graph_b,
            augmented_b,
            vec![0.0],
            Dissipation::Scaled(ScalarFunction::Constant(0.0)),
            Conservation::Scaled(ScalarFunction::Constant(0.0)),
            Propagation::neighbors(&WeightedEdgeGraph::with_node_count(2), ScalarFunction::Constant(0.0)),
            None,
            None,
            pert_core::AgentRng::new(1, TypeId(0)),
        )
        .unwrap();

        let dir_a = scratch_dir("exchange-a");
        let dir_b = scratch_dir("exchange-b");

        let mut scheduler_a = Scheduler::new(
            config.clone(),
            Rank(0),
            PartitionPlan::new(&types, 2).unwrap(),
            ExchangePlan::build(&edges, &PartitionPlan::new(&types, 2).unwrap(), VirtualNodeGranularity::Type, false),
            ContactMap::build(&edges, VirtualNodeGranularity::Type, false),
            t0,
            vec![("A".to_string(), agent_a)],
            CheckpointStore::new(&dir_a).unwrap(),
            Box::new(NullSink),
        )
        .unwrap();

        let mut scheduler_b = Scheduler::new(
            config,
            Rank(1),
            PartitionPlan::new(&types, 2).unwrap(),
            plan,
            contacts,
            t1,
            vec![("B".to_string(), agent_b)],
            CheckpointStore::new(&dir_b).unwrap(),
            Box::new(NullSink),
        )
        .unwrap();

        let handle_a = std::thread::spawn(move || {
            scheduler_a.run().unwrap();
        });
        scheduler_b.run().unwrap();
        handle_a.join().unwrap();

        let (_, agent_b_final) = &scheduler_b.agents()[0];
        let idx = agent_b_final.augmented_graph().index_of("v-in:A").unwrap();
        assert_ne!(agent_b_final.input_augmented()[idx], 0.0, "A's v-out:B contact at t=0 should deliver into B's v-in:A");

        std::fs::remove_dir_all(&dir_a).ok();
        std::fs::remove_dir_all(&dir_b).ok();
    }
}
