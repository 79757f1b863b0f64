//! Scheduler lifecycle hooks for progress reporting and diagnostics.

use pert_core::{InnerStep, OuterStep};

/// Callbacks invoked by [`crate::Scheduler::run`] at key points in the
/// outer/inner loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait SimObserver {
    /// Called once before the first outer iteration runs (after any
    /// checkpoint resume has already repositioned the clock).
    fn on_run_start(&mut self, _outer: OuterStep, _inner: InnerStep) {}

    /// Called at the start of each outer iteration.
    fn on_outer_start(&mut self, _outer: OuterStep) {}

    /// Called after one inner sub-step's perturb/emit/update-input phases
    /// complete, before the next sub-step (or the outer boundary exchange)
    /// begins.
    fn on_inner_step(&mut self, _outer: OuterStep, _inner: InnerStep) {}

    /// Called after the boundary exchange (and optional
    /// `resetVirtualOutputs`) for an outer iteration completes.
    fn on_outer_end(&mut self, _outer: OuterStep) {}

    /// Called once after the final outer iteration completes and output has
    /// been flushed.
    fn on_sim_end(&mut self, _final_outer: OuterStep) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
