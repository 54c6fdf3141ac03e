use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Stage of the fixed execution pipeline.
///
/// Variants are declared in execution order, so the derived `Ord` is the pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStep {
    #[default]
    Init,
    Load,
    Start,
    Stats,
    Metrics,
    Stop,
}

impl TaskStep {
    /// All steps in execution order.
    pub const ALL: [TaskStep; 6] = [
        TaskStep::Init,
        TaskStep::Load,
        TaskStep::Start,
        TaskStep::Stats,
        TaskStep::Metrics,
        TaskStep::Stop,
    ];

    /// Step that follows this one, `None` after `Stop`.
    pub fn next(self) -> Option<TaskStep> {
        match self {
            TaskStep::Init => Some(TaskStep::Load),
            TaskStep::Load => Some(TaskStep::Start),
            TaskStep::Start => Some(TaskStep::Stats),
            TaskStep::Stats => Some(TaskStep::Metrics),
            TaskStep::Metrics => Some(TaskStep::Stop),
            TaskStep::Stop => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStep::Init => "init",
            TaskStep::Load => "load",
            TaskStep::Start => "start",
            TaskStep::Stats => "stats",
            TaskStep::Metrics => "metrics",
            TaskStep::Stop => "stop",
        }
    }
}

impl fmt::Display for TaskStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStep {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        TaskStep::ALL
            .into_iter()
            .find(|step| step.as_str() == norm)
            .ok_or_else(|| ModelError::UnknownStep(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_matches_pipeline() {
        let mut sorted = TaskStep::ALL;
        sorted.sort();
        assert_eq!(sorted, TaskStep::ALL);
        assert!(TaskStep::Init < TaskStep::Stop);
    }

    #[test]
    fn next_walks_the_pipeline() {
        let mut step = TaskStep::Init;
        let mut seen = vec![step];
        while let Some(n) = step.next() {
            seen.push(n);
            step = n;
        }
        assert_eq!(seen, TaskStep::ALL.to_vec());
    }

    #[test]
    fn parse_step() {
        assert_eq!("Metrics".parse::<TaskStep>(), Ok(TaskStep::Metrics));
        assert!("attach".parse::<TaskStep>().is_err());
    }
}
