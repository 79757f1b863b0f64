//! Errors raised by `pert-exchange`.

use pert_core::Rank;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("no channel registered for peer rank {0}")]
    UnknownPeer(Rank),

    #[error("wait({0}) called without a matching post_recv")]
    RecvNotPosted(Rank),

    #[error("channel to rank {0} closed unexpectedly")]
    ChannelClosed(Rank),

    #[error("received buffer from rank {from} has length {got}, expected {expected}")]
    LengthMismatch { from: Rank, got: usize, expected: usize },
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;
