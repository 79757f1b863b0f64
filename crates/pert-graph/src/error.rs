//! Errors raised by `pert-graph`.

use thiserror::Error;

/// Failure modes for graph construction and mutation.
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("duplicate node name: {0:?}")]
    DuplicateNode(String),

    #[error("node {0:?} not found")]
    NodeNotFound(String),

    #[error("node index {0} out of range for a graph with {1} nodes")]
    IndexOutOfRange(usize, usize),

    #[error("name vector length {names} does not match value vector length {values}")]
    NameValueLengthMismatch { names: usize, values: usize },

    #[error("adjacency matrix is not square ({rows}x{cols})")]
    NonSquareAdjacency { rows: usize, cols: usize },

    #[error("malformed virtual node name: {0:?}")]
    MalformedVirtualNode(String),
}

pub type GraphResult<T> = Result<T, GraphError>;
