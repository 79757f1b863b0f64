//! Errors raised by `pert-operators`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum OperatorError {
    #[error("vector length {got} does not match state length {expected}")]
    VectorLengthMismatch { got: usize, expected: usize },

    #[error("conservation weight vector q has length {got}, expected {expected}")]
    WeightVectorLengthMismatch { got: usize, expected: usize },
}

pub type OperatorResult<T> = Result<T, OperatorError>;
