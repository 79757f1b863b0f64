//! Fluent builder for constructing a [`Scheduler`].

use pert_agent::Computation;
use pert_checkpoint::CheckpointStore;
use pert_core::{Rank, SimConfig};
use pert_exchange::{ContactMap, Transport};
use pert_partition::{ExchangePlan, PartitionPlan};

use crate::observer::{NoopObserver, SimObserver};
use crate::output::{NullSink, OutputSink};
use crate::scheduler::Scheduler;
use crate::SimResult;

/// Fluent builder for [`Scheduler<T>`].
///
/// # Required inputs
///
/// - [`SimConfig`], this worker's [`Rank`], the [`PartitionPlan`] and
///   [`ExchangePlan`] shared by every worker, the [`ContactMap`], a
///   [`Transport`] endpoint, and this worker's local `(typeName,
///   Computation)` agents.
///
/// # Optional inputs (have defaults)
///
/// | Method           | Default                                 |
/// |------------------|------------------------------------------|
/// | `.output(sink)`  | [`NullSink`] — no output emitted          |
/// | `.observer(obs)` | [`NoopObserver`] — no progress callbacks  |
pub struct SchedulerBuilder<T: Transport> {
    config: SimConfig,
    own_rank: Rank,
    partition: PartitionPlan,
    exchange_plan: ExchangePlan,
    contact_map: ContactMap,
    transport: T,
    agents: Vec<(String, Computation)>,
    checkpoint: CheckpointStore,
    output: Option<Box<dyn OutputSink>>,
    observer: Option<Box<dyn SimObserver>>,
}

impl<T: Transport> SchedulerBuilder<T> {
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
    ) -> Self {
        Self {
            config,
            own_rank,
            partition,
            exchange_plan,
            contact_map,
            transport,
            agents,
            checkpoint,
            output: None,
            observer: None,
        }
    }

    /// Supply an output sink. If not called, emitted iterations are
    /// discarded.
    pub fn output(mut self, output: Box<dyn OutputSink>) -> Self {
        self.output = Some(output);
        self
    }

    /// Supply a progress observer. If not called, no callbacks fire.
    pub fn observer(mut self, observer: Box<dyn SimObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Validate inputs and return a ready-to-run [`Scheduler`].
    pub fn build(self) -> SimResult<Scheduler<T>> {
        let scheduler = Scheduler::new(
            self.config,
            self.own_rank,
            self.partition,
            self.exchange_plan,
            self.contact_map,
            self.transport,
            self.agents,
            self.checkpoint,
            self.output.unwrap_or_else(|| Box::new(NullSink)),
        )?;
        Ok(scheduler.with_observer(self.observer.unwrap_or_else(|| Box::new(NoopObserver))))
    }
}
