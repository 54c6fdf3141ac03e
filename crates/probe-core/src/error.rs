use probe_model::TaskId;
use thiserror::Error;

/// Errors returned by the orchestrator to its callers.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("task not running: {0}")]
    NotRunning(TaskId),
    #[error("metrics query failed: {0}")]
    Query(#[from] QueryError),
}

/// Task store failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("task not found: {0}")]
    NotFound(TaskId),
    #[error("backend: {0}")]
    Backend(String),
}

/// Loader stage failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoaderError {
    #[error("{0}")]
    Failed(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for LoaderError {
    fn from(e: std::io::Error) -> Self {
        LoaderError::Io(e.to_string())
    }
}

/// Metrics backend failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("transport: {0}")]
    Transport(String),
    #[error("unexpected http status {0}: {1}")]
    Status(u16, String),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("query rejected: {0}")]
    Rejected(String),
}
