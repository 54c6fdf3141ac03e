use std::time::SystemTime;

use probe_model::{ProgStatus, TaskStatus};

use crate::loader::AttachMap;

pub(crate) const PROGRAM_NOT_FOUND: &str = "program not found";

/// Apply attach results to program statuses, matching by program name.
///
/// Programs the loader did not report are marked failed. Count, order and identity
/// of the entries never change. Returns the number of failed programs.
pub(crate) fn reconcile(progs: &mut [ProgStatus], attached: &AttachMap) -> usize {
    let now = SystemTime::now();
    let mut failed = 0;
    for prog in progs.iter_mut() {
        match attached.get(&prog.program_name) {
            Some(outcome) => {
                prog.status = outcome.status;
                prog.attach_id = outcome.attach_id;
                prog.error = outcome.error.clone();
            }
            None => {
                prog.status = TaskStatus::Failed;
                prog.attach_id = None;
                prog.error = Some(PROGRAM_NOT_FOUND.to_string());
            }
        }
        if prog.status == TaskStatus::Failed {
            failed += 1;
        }
        prog.updated_at = now;
    }
    failed
}
