use probe_core::{Subscribe, TaskEvent};

use crate::subscriber::view::log_event;

/// Writes every task lifecycle event to the `tracing` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct Journal;

impl Journal {
    pub fn new() -> Self {
        Self
    }
}

impl Subscribe for Journal {
    fn on_event(&self, event: &TaskEvent) {
        log_event(event);
    }

    fn name(&self) -> &'static str {
        "journal"
    }
}
