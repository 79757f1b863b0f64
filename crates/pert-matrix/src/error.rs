//! Errors raised by `pert-matrix`.

use thiserror::Error;

/// Failure modes for dense matrix and column-vector operations.
#[derive(Debug, Error, PartialEq)]
pub enum MatrixError {
    #[error("index ({row}, {col}) out of range for a {rows}x{cols} matrix")]
    IndexOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("dimension mismatch: {lhs_rows}x{lhs_cols} vs {rhs_rows}x{rhs_cols}")]
    DimensionMismatch {
        lhs_rows: usize,
        lhs_cols: usize,
        rhs_rows: usize,
        rhs_cols: usize,
    },

    #[error("ragged input: row {row} has {got} elements, expected {expected}")]
    RaggedRows {
        row: usize,
        got: usize,
        expected: usize,
    },

    #[error("matrix is not a column vector ({rows}x{cols})")]
    NotAVector { rows: usize, cols: usize },

    #[error("determinant is only defined for square matrices ({rows}x{cols})")]
    NotSquare { rows: usize, cols: usize },

    #[error("vector length {got} does not match expected length {expected}")]
    VectorLengthMismatch { got: usize, expected: usize },
}

pub type MatrixResult<T> = Result<T, MatrixError>;
