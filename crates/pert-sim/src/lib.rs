//! `pert-sim` — the two-level outer/inner scheduler and driver for the
//! perturbation-dynamics simulation framework (spec.md component I, §4.9).
//!
//! # Outer/inner loop
//!
//! ```text
//! for outer in [startOuter, outerMax):
//!   for inner in [startInner, innerMax):
//!     checkpoint.save(outer, inner)
//!     for each local agent a:
//!       a.perturb(t); emitOutput(a, outer, inner)
//!     for each local agent a:
//!       a.update_input(conserveInitialNorm)
//!   exchangeBoundary(outer)
//!   if resetVirtualOutputs: for each local agent a: a.reset_virtual_outputs()
//! ```
//!
//! Checkpoints are written before every inner step so a resumed run restarts
//! from the last successfully completed `(outer, inner)` tuple. Failure of a
//! single agent's perturbation step is fatal and tears down the run.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                      |
//! |------------|--------------------------------------------------------------|
//! | `parallel` | Runs the per-agent perturb/update-input phases on Rayon's thread pool. |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use pert_sim::{NullSink, SchedulerBuilder};
//!
//! let scheduler = SchedulerBuilder::new(config, own_rank, partition, exchange_plan, contacts, transport, agents, checkpoint)
//!     .build()?;
//! scheduler.run()?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod output;
pub mod scheduler;


pub use builder::SchedulerBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use output::{IterationMatrixSink, NullSink, OutputSink, SingleIterationSink};
pub use scheduler::Scheduler;
