//! Top-level run configuration shared by every crate in the workspace.
//!
//! Typically assembled by the application (the code that parses CLI flags
//! and TSV inputs — out of scope for this crate, per spec.md §1) and handed
//! to `pert-sim::Scheduler`.

use crate::error::{PertError, PertResult};

// ── VirtualNodeGranularity ──────────────────────────────────────────────────────

/// Granularity at which virtual boundary nodes are created (spec.md §4.6).
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VirtualNodeGranularity {
    /// One `v-in`/`v-out` pair per peer *type*.
    #[default]
    Type,
    /// One `v-in`/`v-out` pair per (peer type, peer node), added lazily as
    /// interaction edges are ingested.
    TypeAndNode,
}

// ── QuantizationMode ─────────────────────────────────────────────────────────

/// How a continuous contact schedule is converted into the scalar applied at
/// one outer tick (spec.md §4.8).
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QuantizationMode {
    /// Any intersection with the outer-tick interval delivers the value verbatim.
    #[default]
    Single,
    /// The delivered value is scaled by the number of contact times that
    /// fall within the outer-tick interval.
    Multiple,
}

// ── OutputMode ───────────────────────────────────────────────────────────────

/// Output emission strategy (spec.md §4.9 / §6).
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutputMode {
    /// One file per `(agent, iteration)`.
    #[default]
    SingleIteration,
    /// Accumulate all iterations in memory; emit one matrix per agent at
    /// shutdown.
    IterationMatrix,
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Run-wide configuration: iteration counts, time step, operator toggles,
/// and I/O policy.
///
/// Construct with [`SimConfig::validate`] before use — the scheduler refuses
/// to run against an unvalidated config with conflicting flags, per
/// spec.md §7.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Simulated seconds (or any consistent unit) spanned by one outer
    /// iteration's `inner_iterations` sub-steps. Spec.md's Δt.
    pub delta_t: f64,
    /// Number of outer (inter-agent) iterations to run.
    pub outer_iterations: u32,
    /// Number of inner (intra-agent) sub-steps per outer iteration.
    pub inner_iterations: u32,
    /// Virtual-node creation granularity.
    pub virtual_node_granularity: VirtualNodeGranularity,
    /// Contact-schedule quantisation policy.
    pub quantization: QuantizationMode,
    /// Re-enable boundary delivery between two agents of the same type
    /// (suppressed by default per spec.md §4.8).
    pub same_type_communication: bool,
    /// Zero each agent's virtual-output entries after every completed outer
    /// tick.
    pub reset_virtual_outputs: bool,
    /// Rescale `inputAugmented` after `updateInput` so its norm matches the
    /// pre-augmentation `input` vector's norm (spec.md §4.5, §9 open
    /// question — resolved to preserve the *original* input's norm).
    pub conserve_initial_norm: bool,
    /// Symmetric saturation clamp limit. `None` disables saturation.
    pub saturation: Option<f64>,
    /// Output emission strategy.
    pub output_mode: OutputMode,
    /// Directory under which checkpoint files are written/read.
    pub checkpoint_dir: String,
    /// Resume from the latest checkpoint found in `checkpoint_dir` instead
    /// of starting at `(outer=0, inner=0)`.
    pub resume_checkpoint: bool,
    /// Promote a recoverable warning (e.g. a singular `I - W̃` in
    /// `Propagation::Original`) into a fatal `PertError`.
    pub treat_warnings_as_errors: bool,
    /// Master RNG seed for `Dissipation::Random`. Same seed ⇒ identical runs.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            delta_t: 1.0,
            outer_iterations: 1,
            inner_iterations: 1,
            virtual_node_granularity: VirtualNodeGranularity::default(),
            quantization: QuantizationMode::default(),
            same_type_communication: false,
            reset_virtual_outputs: false,
            conserve_initial_norm: false,
            saturation: None,
            output_mode: OutputMode::default(),
            checkpoint_dir: "checkpoints".to_string(),
            resume_checkpoint: false,
            treat_warnings_as_errors: false,
            seed: 0,
        }
    }
}

impl SimConfig {
    /// Validate non-positive counts, non-positive time step, and the
    /// conflicting-flag combinations named in spec.md §7:
    /// a saturation term without saturation enabled is structurally
    /// impossible in this type (saturation is `Option<f64>`), so the only
    /// remaining conflict is `saturation` together with
    /// `conserve_initial_norm`.
    pub fn validate(&self) -> PertResult<()> {
        if self.outer_iterations == 0 {
            return Err(PertError::NonPositiveIterations(self.outer_iterations as i64));
        }
        if self.inner_iterations == 0 {
            return Err(PertError::NonPositiveIterations(self.inner_iterations as i64));
        }
        if self.delta_t <= 0.0 {
            return Err(PertError::NonPositiveTimeStep(self.delta_t));
        }
        if self.saturation.is_some() && self.conserve_initial_norm {
            return Err(PertError::ConflictingFlags(
                "saturation and conserve_initial_norm cannot both be enabled".to_string(),
            ));
        }
        Ok(())
    }
}
