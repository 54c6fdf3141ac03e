use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use probe_model::{Task, TaskId};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::Span;

use crate::loader::Loader;

/// Live execution context of a task.
///
/// The execution unit is the only writer of the task snapshot; everyone else reads it.
pub struct RunningTask {
    task: watch::Sender<Task>,
    token: CancellationToken,
    span: Span,
    loader: Arc<dyn Loader>,
}

impl RunningTask {
    pub fn new(task: Task, token: CancellationToken, span: Span, loader: Arc<dyn Loader>) -> Self {
        let (task, _) = watch::channel(task);
        Self {
            task,
            token,
            span,
            loader,
        }
    }

    pub fn id(&self) -> TaskId {
        self.task.borrow().id
    }

    /// Latest state published by the execution unit.
    pub fn task(&self) -> Task {
        self.task.borrow().clone()
    }

    /// Follow state changes of the task.
    pub fn subscribe(&self) -> watch::Receiver<Task> {
        self.task.subscribe()
    }

    /// Request the execution unit to stop. Returns immediately.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn loader(&self) -> &Arc<dyn Loader> {
        &self.loader
    }

    pub(crate) fn publish(&self, task: &Task) {
        self.task.send_replace(task.clone());
    }
}

/// Concurrent directory of running tasks.
///
/// Cheap to clone; all clones share the same entries.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    inner: Arc<RwLock<HashMap<TaskId, Arc<RunningTask>>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `id`.
    pub fn put(&self, id: TaskId, handle: Arc<RunningTask>) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.insert(id, handle);
    }

    pub fn get(&self, id: &TaskId) -> Option<Arc<RunningTask>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.get(id).cloned()
    }

    /// Remove the entry for `id`; absent ids are ignored.
    pub fn remove(&self, id: &TaskId) -> Option<Arc<RunningTask>> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.remove(id)
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.contains_key(id)
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All entries at the time of the call, in no particular order.
    pub fn snapshot(&self) -> Vec<(TaskId, Arc<RunningTask>)> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .iter()
            .map(|(id, handle)| (*id, Arc::clone(handle)))
            .collect()
    }

    /// Visit every entry of a [`snapshot`](Self::snapshot).
    ///
    /// The lock is released before the first call, so `visit` may modify the registry.
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(TaskId, &Arc<RunningTask>),
    {
        for (id, handle) in self.snapshot() {
            visit(id, &handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::LoaderError, loader::AttachMap};
    use async_trait::async_trait;
    use probe_model::{TaskStatus, TaskStep};
    use std::time::SystemTime;

    struct Idle;

    #[async_trait]
    impl Loader for Idle {
        async fn init(&self) -> Result<(), LoaderError> {
            Ok(())
        }
        async fn load(&self) -> Result<(), LoaderError> {
            Ok(())
        }
        async fn start(&self) -> Result<AttachMap, LoaderError> {
            Ok(AttachMap::new())
        }
        async fn stats(&self) -> Result<(), LoaderError> {
            Ok(())
        }
        async fn metrics(&self) -> Result<(), LoaderError> {
            Ok(())
        }
        async fn stop(&self) -> Result<(), LoaderError> {
            Ok(())
        }
    }

    fn handle(id: u64) -> Arc<RunningTask> {
        let now = SystemTime::now();
        let task = Task {
            id: TaskId(id),
            component_id: 1,
            component_name: "biolatency".into(),
            name: format!("biolatency-{id}"),
            description: String::new(),
            status: TaskStatus::Running,
            step: TaskStep::Init,
            prog_status: Vec::new(),
            error: None,
            created_at: now,
            updated_at: now,
        };
        Arc::new(RunningTask::new(
            task,
            CancellationToken::new(),
            Span::none(),
            Arc::new(Idle),
        ))
    }

    #[test]
    fn put_get_remove() {
        let reg = TaskRegistry::new();
        reg.put(TaskId(1), handle(1));

        assert!(reg.contains(&TaskId(1)));
        assert_eq!(reg.get(&TaskId(1)).unwrap().id(), TaskId(1));

        assert!(reg.remove(&TaskId(1)).is_some());
        assert!(reg.get(&TaskId(1)).is_none());
    }

    #[test]
    fn remove_is_idempotent() {
        let reg = TaskRegistry::new();
        assert!(reg.remove(&TaskId(5)).is_none());
        reg.put(TaskId(5), handle(5));
        reg.remove(&TaskId(5));
        assert!(reg.remove(&TaskId(5)).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn put_replaces_existing_entry() {
        let reg = TaskRegistry::new();
        let first = handle(1);
        let second = handle(1);
        reg.put(TaskId(1), Arc::clone(&first));
        reg.put(TaskId(1), Arc::clone(&second));

        assert_eq!(reg.len(), 1);
        assert!(Arc::ptr_eq(&reg.get(&TaskId(1)).unwrap(), &second));
    }

    #[test]
    fn clones_share_entries() {
        let reg = TaskRegistry::new();
        let other = reg.clone();
        reg.put(TaskId(2), handle(2));
        assert!(other.contains(&TaskId(2)));
    }

    #[test]
    fn for_each_allows_mutation_during_visit() {
        let reg = TaskRegistry::new();
        for id in 1..=4 {
            reg.put(TaskId(id), handle(id));
        }

        let mut visited = 0;
        reg.for_each(|id, _| {
            reg.remove(&id);
            reg.put(TaskId(id.get() + 100), handle(id.get() + 100));
            visited += 1;
        });

        assert_eq!(visited, 4);
        assert_eq!(reg.len(), 4);
        assert!(reg.snapshot().iter().all(|(id, _)| id.get() > 100));
    }

    #[test]
    fn publish_updates_snapshot_and_cancel_fires_token() {
        let h = handle(3);
        let mut rx = h.subscribe();

        let mut task = h.task();
        task.step = TaskStep::Start;
        h.publish(&task);

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().step, TaskStep::Start);
        assert_eq!(h.task().step, TaskStep::Start);

        assert!(!h.is_cancelled());
        h.cancel();
        assert!(h.token().is_cancelled());
    }

    #[test]
    fn concurrent_writers_and_readers() {
        let reg = TaskRegistry::new();
        let threads: Vec<_> = (0..8u64)
            .map(|t| {
                let reg = reg.clone();
                std::thread::spawn(move || {
                    for i in 0..200u64 {
                        let id = t * 1_000 + i;
                        reg.put(TaskId(id), handle(id));
                        let _ = reg.get(&TaskId(id));
                        reg.for_each(|_, _| {});
                        if i % 2 == 0 {
                            reg.remove(&TaskId(id));
                        }
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(reg.len(), 8 * 100);
    }
}
