use async_trait::async_trait;
use probe_model::{Component, Task, TaskId, TaskMetrics};

use crate::error::ApiError;

/// Task control API.
///
/// This trait abstracts the backend implementation, allowing users to:
/// - Use the provided `OrchestratorAdapter`
/// - Wrap it with additional logic (auth, auditing, rate limiting, etc.)
#[async_trait]
pub trait ApiHandler: Send + Sync + 'static {
    /// Create a task for `component` and start it. Returns the task as first persisted.
    async fn create_and_run(&self, component: Component) -> Result<Task, ApiError>;

    /// Request a running task to stop. Does not wait for it.
    async fn stop_task(&self, id: TaskId) -> Result<(), ApiError>;

    /// Live snapshots of every running task.
    async fn list_running(&self) -> Result<Vec<Task>, ApiError>;

    /// Metrics of every program of a task.
    async fn get_task_metrics(&self, id: TaskId) -> Result<TaskMetrics, ApiError>;
}
