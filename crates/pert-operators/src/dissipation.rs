//! Dissipation operators (spec.md §4.4): lossy reduction of the augmented
//! state, applied as the first step of the perturbation kernel.

use pert_core::AgentRng;
use pert_scaling::ScalarFunction;

/// A dissipation operator variant. All variants implement the same
/// contract: `apply(x, t)` returns the post-dissipation state, `term(x, t)`
/// returns just the subtracted amount.
#[derive(Clone, Debug)]
pub enum Dissipation {
    /// `apply(x,t) = x - gamma(t)*x`, `term = gamma(t)*x`.
    Scaled(ScalarFunction),
    /// `apply(x,t) = x - x.^p`, `term = x.^p` (element-wise power).
    Pow(f64),
    /// Each element independently scaled by a fresh `u ~ U[lo, hi]` drawn
    /// every call — requires a per-agent RNG to stay deterministic across a
    /// run (spec.md §4.4, §5).
    Random { lo: f64, hi: f64 },
    /// A scaled variant whose gamma is itself time-periodic:
    /// `gamma(t) = amplitude * sin(2*pi*t/period + phase)`.
    Periodic { amplitude: f64, period: f64, phase: f64 },
}

impl Dissipation {
    fn periodic_gamma(amplitude: f64, period: f64, phase: f64, t: f64) -> f64 {
        amplitude * (2.0 * std::f64::consts::PI * t / period + phase).sin()
    }

    /// Produce the next state after dissipation. `rng` is only consulted by
    /// the `Random` variant.
    pub fn apply(&self, x: &[f64], t: f64, rng: &mut AgentRng) -> Vec<f64> {
        match self {
            Dissipation::Scaled(f) => {
                let gamma = f.eval(t);
                x.iter().map(|&v| v - gamma * v).collect()
            }
            Dissipation::Pow(p) => x.iter().map(|&v| v - v.powf(*p)).collect(),
            Dissipation::Random { lo, hi } => x
                .iter()
                .map(|&v| {
                    let u: f64 = rng.gen_range(*lo..*hi);
                    v - v * u
                })
                .collect(),
            Dissipation::Periodic { amplitude, period, phase } => {
                let gamma = Self::periodic_gamma(*amplitude, *period, *phase, t);
                x.iter().map(|&v| v - gamma * v).collect()
            }
        }
    }

    /// Produce just the dissipated-away term.
    pub fn term(&self, x: &[f64], t: f64, rng: &mut AgentRng) -> Vec<f64> {
        match self {
            Dissipation::Scaled(f) => {
                let gamma = f.eval(t);
                x.iter().map(|&v| gamma * v).collect()
            }
            Dissipation::Pow(p) => x.iter().map(|&v| v.powf(*p)).collect(),
            Dissipation::Random { lo, hi } => x
                .iter()
                .map(|&v| {
                    let u: f64 = rng.gen_range(*lo..*hi);
                    v * u
                })
                .collect(),
            Dissipation::Periodic { amplitude, period, phase } => {
                let gamma = Self::periodic_gamma(*amplitude, *period, *phase, t);
                x.iter().map(|&v| gamma * v).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pert_core::TypeId;

    fn rng() -> AgentRng {
        AgentRng::new(7, TypeId(0))
    }

    #[test]
    fn scaled_apply_and_term_are_complementary() {
        let d = Dissipation::Scaled(ScalarFunction::Constant(0.5));
        let mut rng = rng();
        let x = vec![10.0, 4.0];
        let applied = d.apply(&x, 0.0, &mut rng);
        let term = d.term(&x, 0.0, &mut rng);
        assert_eq!(applied, vec![5.0, 2.0]);
        assert_eq!(term, vec![5.0, 2.0]);
    }

    #[test]
    fn pow_matches_elementwise_power() {
        let d = Dissipation::Pow(2.0);
        let mut rng = rng();
        let x = vec![3.0, 4.0];
        assert_eq!(d.term(&x, 0.0, &mut rng), vec![9.0, 16.0]);
        assert_eq!(d.apply(&x, 0.0, &mut rng), vec![-6.0, -12.0]);
    }

    #[test]
    fn random_stays_in_range_and_is_deterministic_per_seed() {
        let d = Dissipation::Random { lo: 0.0, hi: 1.0 };
        let x = vec![10.0];
        let mut rng_a = AgentRng::new(1, TypeId(2));
        let mut rng_b = AgentRng::new(1, TypeId(2));
        let a = d.term(&x, 0.0, &mut rng_a);
        let b = d.term(&x, 0.0, &mut rng_b);
        assert_eq!(a, b);
        assert!(a[0] >= 0.0 && a[0] <= 10.0);
    }

    #[test]
    fn periodic_gamma_is_bounded_by_amplitude() {
        let d = Dissipation::Periodic {
            amplitude: 2.0,
            period: 4.0,
            phase: 0.0,
        };
        let mut rng = rng();
        let x = vec![1.0];
        for t in [0.0, 1.0, 2.0, 3.0, 4.0] {
            let term = d.term(&x, t, &mut rng);
            assert!(term[0].abs() <= 2.0 + 1e-9);
        }
    }
}
