//! Errors raised by `pert-agent`.

use pert_graph::GraphError;
use pert_operators::OperatorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Operator(#[from] OperatorError),

    #[error("input vector length {got} does not match the un-augmented graph's node count {expected}")]
    InputLengthMismatch { got: usize, expected: usize },

    #[error("perturb called before the agent's augmented state was initialized")]
    Uninitialized,
}

pub type AgentResult<T> = Result<T, AgentError>;
