use std::borrow::Borrow;

use probe_core::{EventKind, TaskEvent};
use tracing::{Level, debug, error, info, trace, warn};

/// Field accessors used when rendering a [`TaskEvent`].
pub trait View {
    fn task(&self) -> u64;
    fn step(&self) -> &str;
    fn reason(&self) -> &str;
    fn kind(&self) -> EventKind;
}

impl<T> View for T
where
    T: Borrow<TaskEvent>,
{
    #[inline]
    fn task(&self) -> u64 {
        self.borrow().task_id.get()
    }
    #[inline]
    fn step(&self) -> &str {
        self.borrow().step.map(|s| s.as_str()).unwrap_or("-")
    }
    #[inline]
    fn reason(&self) -> &str {
        self.borrow().reason.as_deref().unwrap_or("unknown")
    }
    #[inline]
    fn kind(&self) -> EventKind {
        self.borrow().kind
    }
}

#[inline]
pub fn message_for(kind: EventKind) -> &'static str {
    match kind {
        // creation
        EventKind::TaskCreated => "task created",
        EventKind::TaskRunning => "task marked running",
        EventKind::TaskRegistered => "execution context registered",
        EventKind::TaskRemoved => "execution context removed",

        // pipeline
        EventKind::StepEntered => "step entered",
        EventKind::StepFailed => "step failed; task marked failed",
        EventKind::ProgramsReconciled => "program attach results applied",

        // stop
        EventKind::CancelRequested => "stop requested",
        EventKind::ShutdownObserved => "process shutdown observed",
        EventKind::StopFailed => "loader stop failed; continuing",
        EventKind::TaskSucceeded => "task stopped successfully",

        // store
        EventKind::PersistFailed => "task state could not be persisted",
    }
}

/// Log level an event kind is written at.
pub fn level_for(kind: EventKind) -> Level {
    match kind {
        EventKind::TaskRegistered | EventKind::TaskRemoved => Level::TRACE,
        EventKind::TaskRunning | EventKind::StepEntered | EventKind::ProgramsReconciled => {
            Level::DEBUG
        }
        EventKind::TaskCreated
        | EventKind::CancelRequested
        | EventKind::ShutdownObserved
        | EventKind::TaskSucceeded => Level::INFO,
        EventKind::StopFailed => Level::WARN,
        EventKind::StepFailed | EventKind::PersistFailed => Level::ERROR,
    }
}

#[inline]
pub fn log_event<E: View>(e: E) {
    let msg = message_for(e.kind());

    match level_for(e.kind()) {
        Level::TRACE => trace!(task = e.task(), step = e.step(), "{msg}"),
        Level::DEBUG => debug!(task = e.task(), step = e.step(), "{msg}"),
        Level::INFO => info!(task = e.task(), step = e.step(), "{msg}"),
        Level::WARN => warn!(
            task = e.task(),
            step = e.step(),
            reason = e.reason(),
            "{msg}"
        ),
        _ => error!(
            task = e.task(),
            step = e.step(),
            reason = e.reason(),
            "{msg}"
        ),
    }
}
