use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::{Component, ComponentId, Program, ProgramId, TaskStatus};

/// Per-program execution outcome within a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgStatus {
    pub component_id: ComponentId,
    pub component_name: String,
    pub program_id: ProgramId,
    pub program_name: String,
    pub status: TaskStatus,
    /// Attach handle reported by the loader.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(with = "super::time_serde")]
    pub created_at: SystemTime,
    #[serde(with = "super::time_serde")]
    pub updated_at: SystemTime,
}

impl ProgStatus {
    /// Fresh `Pending` entry for `program` of `component`.
    pub fn pending(component: &Component, program: &Program) -> Self {
        let now = SystemTime::now();
        Self {
            component_id: component.id,
            component_name: component.name.clone(),
            program_id: program.id,
            program_name: program.name.clone(),
            status: TaskStatus::Pending,
            attach_id: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}
