use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Execution state of a task or of a single program unit.
///
/// `Pending -> Running -> {Succeeded, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    /// Created, execution not started yet.
    #[default]
    Pending,
    /// Execution unit owns the task and drives its steps.
    Running,
    /// Workload was stopped after a complete run.
    Succeeded,
    /// A step failed; `error` carries the cause.
    Failed,
}

impl TaskStatus {
    /// Returns `true` if the task is in a terminal state (won't transition further).
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed)
    }

    /// Returns `true` if the task is still active (pending or running).
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "running" => Ok(TaskStatus::Running),
            "succeeded" | "success" => Ok(TaskStatus::Succeeded),
            "failed" => Ok(TaskStatus::Failed),
            _ => Err(ModelError::UnknownStatus(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(TaskStatus::Succeeded.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());

        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
    }

    #[test]
    fn active_states() {
        assert!(TaskStatus::Pending.is_active());
        assert!(TaskStatus::Running.is_active());

        assert!(!TaskStatus::Succeeded.is_active());
        assert!(!TaskStatus::Failed.is_active());
    }

    #[test]
    fn parse_accepts_legacy_success() {
        assert_eq!("success".parse::<TaskStatus>(), Ok(TaskStatus::Succeeded));
        assert_eq!(" Running ".parse::<TaskStatus>(), Ok(TaskStatus::Running));
        assert!(matches!(
            "done".parse::<TaskStatus>(),
            Err(ModelError::UnknownStatus(_))
        ));
    }

    #[test]
    fn serde_uses_camel_case() {
        let json = serde_json::to_string(&TaskStatus::Succeeded).unwrap();
        assert_eq!(json, r#""succeeded""#);

        let back: TaskStatus = serde_json::from_str(r#""pending""#).unwrap();
        assert_eq!(back, TaskStatus::Pending);
    }
}
