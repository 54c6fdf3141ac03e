//! Lifecycle events published by the orchestrator.

use std::sync::Arc;

use probe_model::{TaskId, TaskStep};

/// What happened to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // management
    /// Task record persisted, execution unit about to be spawned.
    TaskCreated,
    /// Execution unit persisted `Running`.
    TaskRunning,
    /// Live handle published into the registry.
    TaskRegistered,
    /// Live handle removed from the registry (unit finished).
    TaskRemoved,

    // pipeline
    /// Step persisted, loader stage about to run.
    StepEntered,
    /// Loader stage failed; the task is `Failed`.
    StepFailed,
    /// Program statuses updated from the attach results.
    ProgramsReconciled,

    // stop
    /// Cancellation requested by a caller.
    CancelRequested,
    /// Process-wide shutdown woke the unit.
    ShutdownObserved,
    /// Loader stop stage returned an error (ignored).
    StopFailed,
    /// Task stopped after a complete run.
    TaskSucceeded,

    // store
    /// Writing the task record failed.
    PersistFailed,
}

/// Lifecycle event of a single task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEvent {
    pub task_id: TaskId,
    pub kind: EventKind,
    pub step: Option<TaskStep>,
    pub reason: Option<String>,
}

impl TaskEvent {
    pub fn new(task_id: TaskId, kind: EventKind) -> Self {
        Self {
            task_id,
            kind,
            step: None,
            reason: None,
        }
    }

    pub fn with_step(mut self, step: TaskStep) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Receiver of lifecycle events.
///
/// Called inline on the emitting task, including from drop paths, so implementations must not block.
pub trait Subscribe: Send + Sync + 'static {
    fn on_event(&self, event: &TaskEvent);

    fn name(&self) -> &'static str;
}

/// Fan-out of events to every subscriber.
#[derive(Clone, Default)]
pub(crate) struct EventBus {
    subscribers: Arc<[Arc<dyn Subscribe>]>,
}

impl EventBus {
    pub(crate) fn new(subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        Self {
            subscribers: subscribers.into(),
        }
    }

    pub(crate) fn emit(&self, event: TaskEvent) {
        for sub in self.subscribers.iter() {
            sub.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<TaskEvent>>);

    impl Subscribe for Collect {
        fn on_event(&self, event: &TaskEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
        fn name(&self) -> &'static str {
            "collect"
        }
    }

    #[test]
    fn bus_fans_out_to_every_subscriber() {
        let a = Arc::new(Collect::default());
        let b = Arc::new(Collect::default());
        let bus = EventBus::new(vec![a.clone(), b.clone()]);

        bus.emit(
            TaskEvent::new(TaskId(3), EventKind::StepFailed)
                .with_step(TaskStep::Load)
                .with_reason("boom"),
        );

        for sub in [a, b] {
            let events = sub.0.lock().unwrap();
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].step, Some(TaskStep::Load));
            assert_eq!(events[0].reason.as_deref(), Some("boom"));
        }
    }

    #[test]
    fn empty_bus_is_noop() {
        EventBus::default().emit(TaskEvent::new(TaskId(1), EventKind::TaskCreated));
    }
}
