use probe_core::{CoreError, StoreError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("task not running: {0}")]
    TaskNotRunning(String),

    /// Store or metrics backend failure; the request may succeed later.
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotRunning(id) => ApiError::TaskNotRunning(id.to_string()),
            CoreError::Store(StoreError::NotFound(id)) => ApiError::TaskNotFound(id.to_string()),
            CoreError::Store(e) => ApiError::Backend(format!("store: {e}")),
            CoreError::Query(e) => ApiError::Backend(format!("metrics: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use probe_core::QueryError;
    use probe_model::TaskId;

    #[test]
    fn maps_core_errors() {
        assert_eq!(
            ApiError::from(CoreError::NotRunning(TaskId(4))),
            ApiError::TaskNotRunning("4".into())
        );
        assert_eq!(
            ApiError::from(CoreError::Store(StoreError::NotFound(TaskId(9)))),
            ApiError::TaskNotFound("9".into())
        );
        assert_eq!(
            ApiError::from(CoreError::Store(StoreError::Backend("locked".into()))),
            ApiError::Backend("store: backend: locked".into())
        );
        assert_eq!(
            ApiError::from(CoreError::Query(QueryError::Status(503, "busy".into()))),
            ApiError::Backend("metrics: unexpected http status 503: busy".into())
        );
    }
}
