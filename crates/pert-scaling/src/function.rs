//! Scalar and vectorised scaling functions, and the saturation clamp
//! (spec.md §4.3).

/// A single node's time-indexed scaling curve.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ScalarFunction {
    /// A fixed value for all time — the fallback used when no parameter
    /// file is supplied at all.
    Constant(f64),
    /// The three-plateau step function the original implementation uses
    /// when parameters are supplied: `p0` for `t <= 5`, `p1` for
    /// `5 < t <= 6`, `p2` for `t > 6` (the last plateau extends
    /// indefinitely — there is no fourth segment).
    Step(StepFunction),
}

impl ScalarFunction {
    pub fn eval(&self, t: f64) -> f64 {
        match self {
            ScalarFunction::Constant(c) => *c,
            ScalarFunction::Step(s) => s.eval(t),
        }
    }
}

impl Default for ScalarFunction {
    /// The constant `0.5` used whenever no file-backed parameters apply
    /// (spec.md §4.3: "When no file at all is provided, the function
    /// returns the constant 0.5").
    fn default() -> Self {
        ScalarFunction::Constant(0.5)
    }
}

/// Three-plateau step function over `[p0, p1, p2]`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct StepFunction {
    pub p0: f64,
    pub p1: f64,
    pub p2: f64,
}

impl StepFunction {
    pub fn new(p0: f64, p1: f64, p2: f64) -> Self {
        Self { p0, p1, p2 }
    }

    pub fn eval(&self, t: f64) -> f64 {
        if t <= 5.0 {
            self.p0
        } else if t <= 6.0 {
            self.p1
        } else {
            self.p2
        }
    }
}

/// The state-dependent saturation applied after propagation (spec.md §4.3,
/// §4.5). Unlike [`ScalarFunction`] this is not time-indexed — it clamps a
/// value using the current saturation limit `s`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum SaturationFunction {
    /// `clamp(v, -s, +s)` — the default.
    Clamp,
    /// A scaled hyperbolic tangent: `s * tanh(v / s)`, computed the same
    /// way as the original implementation's `hyperbolicTangentScaled`
    /// (`original_source/src/utils/mathUtilities.cxx`), rather than via
    /// `f64::tanh` directly, so the two stay bit-for-bit aligned.
    ScaledTanh,
}

impl SaturationFunction {
    pub fn apply(&self, value: f64, limit: f64) -> f64 {
        match self {
            SaturationFunction::Clamp => value.clamp(-limit, limit),
            SaturationFunction::ScaledTanh => {
                let first = (value / limit).exp();
                let second = (-value / limit).exp();
                limit * (first - second) / (first + second)
            }
        }
    }

    pub fn apply_vector(&self, values: &[f64], limit: f64) -> Vec<f64> {
        values.iter().map(|&v| self.apply(v, limit)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_function_plateaus() {
        let f = StepFunction::new(1.0, 2.0, 3.0);
        assert_eq!(f.eval(0.0), 1.0);
        assert_eq!(f.eval(5.0), 1.0);
        assert_eq!(f.eval(5.5), 2.0);
        assert_eq!(f.eval(6.0), 2.0);
        assert_eq!(f.eval(6.1), 3.0);
        assert_eq!(f.eval(10.0), 3.0);
        assert_eq!(f.eval(1000.0), 3.0, "last plateau extends indefinitely");
    }

    #[test]
    fn default_scalar_function_is_constant_half() {
        assert_eq!(ScalarFunction::default().eval(123.0), 0.5);
    }

    #[test]
    fn clamp_saturation_is_symmetric() {
        assert_eq!(SaturationFunction::Clamp.apply(10.0, 2.0), 2.0);
        assert_eq!(SaturationFunction::Clamp.apply(-10.0, 2.0), -2.0);
        assert_eq!(SaturationFunction::Clamp.apply(1.0, 2.0), 1.0);
    }

    #[test]
    fn scaled_tanh_is_odd_and_bounded() {
        let s = SaturationFunction::ScaledTanh;
        let limit = 3.0;
        let pos = s.apply(100.0, limit);
        let neg = s.apply(-100.0, limit);
        assert!((pos - limit).abs() < 1e-6);
        assert!((neg + limit).abs() < 1e-6);
    }
}
