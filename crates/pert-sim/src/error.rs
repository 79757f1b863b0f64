//! `pert-sim`'s unified error type. Wraps every sub-crate's local error so
//! the driver can report a single first cause on failure (spec.md §7).

use pert_agent::AgentError;
use pert_checkpoint::CheckpointError;
use pert_exchange::ExchangeError;
use pert_partition::PartitionError;
use pert_core::PertError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] PertError),

    #[error("agent error for type {type_name}: {source}")]
    Agent { type_name: String, #[source] source: AgentError },

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error(transparent)]
    Partition(#[from] PartitionError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error("output I/O error: {0}")]
    Output(#[from] std::io::Error),

    #[error("{what} length {got} does not match agent count {expected}")]
    AgentCountMismatch { expected: usize, got: usize, what: &'static str },
}

pub type SimResult<T> = Result<T, SimError>;
