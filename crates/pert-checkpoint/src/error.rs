//! Errors raised by `pert-checkpoint`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("cannot create checkpoint directory {path}: {source}")]
    CreateDir { path: String, #[source] source: std::io::Error },

    #[error("cannot open checkpoint file {path}: {source}")]
    OpenFile { path: String, #[source] source: std::io::Error },

    #[error("cannot read checkpoint directory {path}: {source}")]
    ReadDir { path: String, #[source] source: std::io::Error },

    #[error("no checkpoint found for type {0}")]
    NotFound(String),

    #[error("malformed checkpoint filename: {0}")]
    MalformedFilename(String),

    #[error("malformed checkpoint row {0:?}")]
    MalformedRow(String),

    #[error("cannot delete checkpoint file {path}: {source}")]
    Delete { path: String, #[source] source: std::io::Error },
}

pub type CheckpointResult<T> = Result<T, CheckpointError>;
