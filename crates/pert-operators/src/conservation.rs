//! Conservation operators (spec.md §4.4): redistribute dissipated mass back
//! along incoming weights.

use pert_matrix::Matrix;
use pert_scaling::ScalarFunction;

use crate::error::{OperatorError, OperatorResult};

/// A conservation operator variant. The baseline (and, per spec.md, only
/// required) variant is [`Conservation::Scaled`].
#[derive(Clone, Debug)]
pub enum Conservation {
    /// `apply(x_d, x, W*, t, q) = x_d - (theta(t) * W* * q) ⊙ x`.
    Scaled(ScalarFunction),
}

impl Conservation {
    /// `q` defaults to a vector of ones when `None` (spec.md §4.4: "all the
    /// weights of the edges are considered of the same importance").
    fn resolve_weights(q: Option<&[f64]>, len: usize) -> OperatorResult<Vec<f64>> {
        match q {
            Some(q) if q.len() == len => Ok(q.to_vec()),
            Some(q) => Err(OperatorError::WeightVectorLengthMismatch { got: q.len(), expected: len }),
            None => Ok(vec![1.0; len]),
        }
    }

    /// `x_dissipated - (theta(t) * W* * q) ⊙ x`.
    pub fn apply(
        &self,
        x: &[f64],
        x_dissipated: &[f64],
        w_star: &Matrix,
        t: f64,
        q: Option<&[f64]>,
    ) -> OperatorResult<Vec<f64>> {
        if x.len() != x_dissipated.len() {
            return Err(OperatorError::VectorLengthMismatch {
                got: x_dissipated.len(),
                expected: x.len(),
            });
        }
        let term = self.term(x, w_star, t, q)?;
        Ok(x_dissipated.iter().zip(&term).map(|(d, tm)| d - tm).collect())
    }

    /// `(theta(t) * W* * q) ⊙ x`.
    pub fn term(&self, x: &[f64], w_star: &Matrix, t: f64, q: Option<&[f64]>) -> OperatorResult<Vec<f64>> {
        let Conservation::Scaled(f) = self;
        let theta = f.eval(t);
        let weights = Self::resolve_weights(q, x.len())?;
        let w_star_q = w_star
            .mul_vector(&weights)
            .map_err(|_| OperatorError::VectorLengthMismatch { got: weights.len(), expected: w_star.cols() })?;
        Ok(x
            .iter()
            .zip(&w_star_q)
            .map(|(xi, wq)| theta * wq * xi)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_q_is_all_ones() {
        let c = Conservation::Scaled(ScalarFunction::Constant(1.0));
        let w_star = Matrix::identity(2);
        let x = vec![2.0, 3.0];
        let term = c.term(&x, &w_star, 0.0, None).unwrap();
        assert_eq!(term, vec![2.0, 3.0]);
    }

    #[test]
    fn apply_subtracts_term_from_dissipated() {
        let c = Conservation::Scaled(ScalarFunction::Constant(1.0));
        let w_star = Matrix::identity(2);
        let x = vec![2.0, 3.0];
        let x_dissipated = vec![10.0, 10.0];
        let out = c.apply(&x, &x_dissipated, &w_star, 0.0, None).unwrap();
        assert_eq!(out, vec![8.0, 7.0]);
    }

    #[test]
    fn mismatched_q_length_fails() {
        let c = Conservation::Scaled(ScalarFunction::Constant(1.0));
        let w_star = Matrix::identity(2);
        let x = vec![2.0, 3.0];
        assert!(c.term(&x, &w_star, 0.0, Some(&[1.0])).is_err());
    }
}
