use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::{ComponentId, ProgStatus, TaskId, TaskStatus, TaskStep};

/// One execution attempt of a component's workload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Assigned by the task store on creation.
    pub id: TaskId,
    pub component_id: ComponentId,
    pub component_name: String,
    pub name: String,
    pub description: String,
    pub status: TaskStatus,
    pub step: TaskStep,
    #[serde(default)]
    pub prog_status: Vec<ProgStatus>,
    /// Failure cause, set only when `status` is `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(with = "super::time_serde")]
    pub created_at: SystemTime,
    #[serde(with = "super::time_serde")]
    pub updated_at: SystemTime,
}

impl Task {
    /// Bump `updated_at`.
    #[inline]
    pub fn touch(&mut self) {
        self.updated_at = SystemTime::now();
    }

    /// Move the pipeline to `step`.
    ///
    /// Steps never go backwards: a `step` at or before the current one leaves the task unchanged.
    pub fn advance(&mut self, step: TaskStep) {
        if step > self.step {
            self.step = step;
        }
        self.touch();
    }

    /// Mark the task failed with `error`.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = TaskStatus::Failed;
        self.error = Some(error.into());
        self.touch();
    }

    /// Mark the task stopped after a full run.
    pub fn succeed(&mut self) {
        self.step = TaskStep::Stop;
        self.status = TaskStatus::Succeeded;
        self.error = None;
        self.touch();
    }
}
