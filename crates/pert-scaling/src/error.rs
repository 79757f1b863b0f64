//! Errors raised by `pert-scaling`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ScalingError {
    #[error("parameter file header must start with \"name\\tparameters\", got {0:?}")]
    BadHeader(String),

    #[error("row {row} has no parameters column")]
    MissingParameters { row: usize },

    #[error("row {row}: could not parse {value:?} as a real number")]
    BadParameter { row: usize, value: String },

    #[error("node vector length {got} does not match expected length {expected}")]
    VectorLengthMismatch { got: usize, expected: usize },
}

pub type ScalingResult<T> = Result<T, ScalingError>;
