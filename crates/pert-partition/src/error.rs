//! Errors raised by `pert-partition`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PartitionError {
    #[error("cannot partition {type_count} types across {num_ranks} ranks")]
    InvalidRankCount { type_count: usize, num_ranks: usize },

    #[error("agent type {0:?} is not owned by any rank")]
    TypeNotOwned(String),
}

pub type PartitionResult<T> = Result<T, PartitionError>;
