use std::{
    collections::HashMap,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use probe_model::{Task, TaskId};

use crate::{error::StoreError, store::TaskStore};

/// In-memory [`TaskStore`].
///
/// Ids are assigned sequentially starting at 1.
#[derive(Clone, Default)]
pub struct MemoryTaskStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    tasks: RwLock<HashMap<TaskId, Task>>,
    last_id: AtomicU64,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tasks.
    pub fn len(&self) -> usize {
        self.read(|tasks| tasks.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of a stored task without going through the async API.
    pub fn snapshot(&self, id: TaskId) -> Option<Task> {
        self.read(|tasks| tasks.get(&id).cloned())
    }

    fn read<R>(&self, f: impl FnOnce(&HashMap<TaskId, Task>) -> R) -> R {
        let tasks = self
            .inner
            .tasks
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&tasks)
    }

    fn write<R>(&self, f: impl FnOnce(&mut HashMap<TaskId, Task>) -> R) -> R {
        let mut tasks = self
            .inner
            .tasks
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut tasks)
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn create_task(&self, mut task: Task) -> Result<Task, StoreError> {
        task.id = TaskId(self.inner.last_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.write(|tasks| tasks.insert(task.id, task.clone()));
        Ok(task)
    }

    async fn update_task(&self, task: &Task) -> Result<(), StoreError> {
        self.write(|tasks| match tasks.get_mut(&task.id) {
            Some(slot) => {
                *slot = task.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(task.id)),
        })
    }

    async fn get_task(&self, id: TaskId) -> Result<Task, StoreError> {
        self.snapshot(id).ok_or(StoreError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use probe_model::{TaskStatus, TaskStep};
    use std::time::SystemTime;

    fn task(name: &str) -> Task {
        let now = SystemTime::now();
        Task {
            id: TaskId::default(),
            component_id: 1,
            component_name: "execsnoop".into(),
            name: name.into(),
            description: String::new(),
            status: TaskStatus::Pending,
            step: TaskStep::Init,
            prog_status: Vec::new(),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = MemoryTaskStore::new();
        let a = store.create_task(task("a")).await.unwrap();
        let b = store.create_task(task("b")).await.unwrap();

        assert_eq!(a.id, TaskId(1));
        assert_eq!(b.id, TaskId(2));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn update_overwrites_full_record() {
        let store = MemoryTaskStore::new();
        let mut t = store.create_task(task("a")).await.unwrap();

        t.status = TaskStatus::Running;
        t.step = TaskStep::Load;
        store.update_task(&t).await.unwrap();

        let back = store.get_task(t.id).await.unwrap();
        assert_eq!(back.status, TaskStatus::Running);
        assert_eq!(back.step, TaskStep::Load);
    }

    #[tokio::test]
    async fn missing_task_is_not_found() {
        let store = MemoryTaskStore::new();
        assert_eq!(
            store.get_task(TaskId(9)).await,
            Err(StoreError::NotFound(TaskId(9)))
        );

        let mut t = task("ghost");
        t.id = TaskId(9);
        assert_eq!(
            store.update_task(&t).await,
            Err(StoreError::NotFound(TaskId(9)))
        );
        assert!(store.is_empty());
    }
}
