use async_trait::async_trait;
use probe_core::TaskOrchestrator;
use probe_model::{Component, Task, TaskId, TaskMetrics};
use tracing::debug;

use crate::error::ApiError;
use crate::handler::ApiHandler;

/// [`ApiHandler`] that delegates straight to a [`TaskOrchestrator`].
#[derive(Clone)]
pub struct OrchestratorAdapter {
    orchestrator: TaskOrchestrator,
}

impl OrchestratorAdapter {
    pub fn new(orchestrator: TaskOrchestrator) -> Self {
        Self { orchestrator }
    }

    pub fn orchestrator(&self) -> &TaskOrchestrator {
        &self.orchestrator
    }
}

#[async_trait]
impl ApiHandler for OrchestratorAdapter {
    async fn create_and_run(&self, component: Component) -> Result<Task, ApiError> {
        debug!(component = %component.name, "create and run requested");
        Ok(self.orchestrator.create_and_run(&component).await?)
    }

    async fn stop_task(&self, id: TaskId) -> Result<(), ApiError> {
        Ok(self.orchestrator.stop_task(id)?)
    }

    async fn list_running(&self) -> Result<Vec<Task>, ApiError> {
        Ok(self.orchestrator.list_running())
    }

    async fn get_task_metrics(&self, id: TaskId) -> Result<TaskMetrics, ApiError> {
        Ok(self.orchestrator.get_task_metrics(id).await?)
    }
}
