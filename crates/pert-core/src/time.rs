//! Two-level iteration time model.
//!
//! # Design
//!
//! The scheduler (spec.md §4.9) is driven by two nested counters rather than
//! a single tick: an outer, inter-agent iteration `OuterStep` quantised to
//! the contact timeline, and an inner, intra-agent iteration `InnerStep`
//! that runs `inner_iterations` sub-steps between two boundary exchanges.
//! The continuous time fed to the scaling functions and operators is:
//!
//! ```text
//! t(outer, inner) = (outer * inner_iterations + inner) * (delta_t / inner_iterations)
//! ```
//!
//! which is exactly spec.md §4.5's "Time passed to each operator" formula.
//! Keeping `OuterStep`/`InnerStep` as distinct integer counters (rather than
//! folding straight to `f64`) keeps checkpoint filenames
//! (`checkpoint_<type>_<outer>_<inner>.tsv`, spec.md §6) and resumption exact.

use std::fmt;

// ── OuterStep / InnerStep ──────────────────────────────────────────────────────

/// Index of the outer (inter-agent) iteration. Bracketed by boundary
/// exchanges; spec.md's "outer tick".
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OuterStep(pub u32);

/// Index of the inner (intra-agent) sub-step within one outer iteration.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InnerStep(pub u32);

impl fmt::Display for OuterStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for InnerStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tracks the scheduler's current position in the two-level iteration space
/// and converts `(outer, inner)` pairs into the continuous time passed to
/// the perturbation operators.
///
/// `SimClock` is cheap to copy and holds no heap data.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Simulated seconds (or any consistent unit) represented by one full
    /// pass of `inner_iterations` sub-steps. Spec.md's Δt.
    pub delta_t: f64,
    /// Sub-steps per outer iteration. Spec.md's `intraIterations`.
    pub inner_iterations: u32,
    /// Current outer iteration — advanced by `SimClock::advance_outer`.
    pub outer: OuterStep,
    /// Current inner iteration within `outer` — advanced by `advance_inner`.
    pub inner: InnerStep,
}

impl SimClock {
    /// Create a clock starting at `(outer=0, inner=0)`.
    pub fn new(delta_t: f64, inner_iterations: u32) -> Self {
        Self {
            delta_t,
            inner_iterations,
            outer: OuterStep(0),
            inner: InnerStep(0),
        }
    }

    /// Continuous simulation time for the current `(outer, inner)` position.
    ///
    /// `t = (outer * inner_iterations + inner) * (delta_t / inner_iterations)`
    /// — spec.md §4.5.
    #[inline]
    pub fn time(&self) -> f64 {
        Self::time_at(self.outer, self.inner, self.delta_t, self.inner_iterations)
    }

    /// Same computation as [`Self::time`] for an arbitrary `(outer, inner)`
    /// pair, e.g. when resuming from a checkpoint.
    #[inline]
    pub fn time_at(outer: OuterStep, inner: InnerStep, delta_t: f64, inner_iterations: u32) -> f64 {
        let step = outer.0 as u64 * inner_iterations as u64 + inner.0 as u64;
        step as f64 * (delta_t / inner_iterations as f64)
    }

    /// Advance to the next inner sub-step; wraps to the next outer iteration
    /// (resetting `inner` to zero) once `inner_iterations` is reached.
    ///
    /// Returns `true` if an outer boundary was crossed (i.e. a boundary
    /// exchange must run before the next inner step).
    #[inline]
    pub fn advance_inner(&mut self) -> bool {
        self.inner = InnerStep(self.inner.0 + 1);
        if self.inner.0 >= self.inner_iterations {
            self.inner = InnerStep(0);
            self.outer = OuterStep(self.outer.0 + 1);
            true
        } else {
            false
        }
    }

    /// The half-open outer-tick interval `[outer*delta_t, (outer+1)*delta_t)`
    /// used by the contact-gate test (spec.md §4.8).
    #[inline]
    pub fn outer_interval(&self) -> (f64, f64) {
        Self::outer_interval_for(self.outer, self.delta_t)
    }

    #[inline]
    pub fn outer_interval_for(outer: OuterStep, delta_t: f64) -> (f64, f64) {
        let start = outer.0 as f64 * delta_t;
        (start, start + delta_t)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(outer={}, inner={}, t={:.4})", self.outer, self.inner, self.time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_formula_matches_spec() {
        let clock = SimClock {
            delta_t: 2.0,
            inner_iterations: 4,
            outer: OuterStep(1),
            inner: InnerStep(2),
        };
        // (1*4 + 2) * (2.0/4) = 6 * 0.5 = 3.0
        assert_eq!(clock.time(), 3.0);
    }

    #[test]
    fn advance_inner_wraps_to_outer() {
        let mut clock = SimClock::new(1.0, 2);
        assert!(!clock.advance_inner()); // inner 0 -> 1
        assert_eq!(clock.inner, InnerStep(1));
        assert!(clock.advance_inner()); // inner 1 -> wraps
        assert_eq!(clock.outer, OuterStep(1));
        assert_eq!(clock.inner, InnerStep(0));
    }

    #[test]
    fn outer_interval_half_open() {
        let (lo, hi) = SimClock::outer_interval_for(OuterStep(2), 1.5);
        assert_eq!(lo, 3.0);
        assert_eq!(hi, 4.5);
    }
}
