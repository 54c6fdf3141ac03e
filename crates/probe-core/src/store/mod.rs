//! Durable task records.

use async_trait::async_trait;
use probe_model::{Task, TaskId};

use crate::error::StoreError;

mod memory;
pub use memory::MemoryTaskStore;

/// CRUD access to persisted tasks.
///
/// Every mutation writes the full record; there is no partial update.
#[async_trait]
pub trait TaskStore: Send + Sync + 'static {
    /// Persist a new task and return it with its assigned id.
    async fn create_task(&self, task: Task) -> Result<Task, StoreError>;

    /// Overwrite an existing task.
    async fn update_task(&self, task: &Task) -> Result<(), StoreError>;

    async fn get_task(&self, id: TaskId) -> Result<Task, StoreError>;
}
