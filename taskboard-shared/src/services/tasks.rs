/// Task component
///
/// Owner-scoped task operations. Ownership and the soft-delete flag are
/// enforced inside the store's filtered operations, so a task that is
/// missing, foreign or already deleted all surface as [`TaskServiceError::NotFound`].

use std::sync::Arc;

use uuid::Uuid;

use crate::models::{NewTask, Task, TaskChanges};
use crate::store::{StoreError, TaskStore};

/// Error type for the task component
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    #[error("Failed to create tasks")]
    CreateFailed(#[source] StoreError),

    #[error("Failed to fetch tasks")]
    FetchFailed(#[source] StoreError),

    /// No non-deleted task with this ID belongs to the caller
    #[error("Task not found")]
    NotFound,

    #[error("Failed to update task")]
    UpdateFailed(#[source] StoreError),

    #[error("Failed to delete task")]
    DeleteFailed(#[source] StoreError),
}

/// Task result type alias
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Per-owner task operations
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>) -> Self {
        Self { tasks }
    }

    /// Creates every item for `owner`, or none of them
    pub async fn create_bulk(&self, owner: Uuid, items: Vec<NewTask>) -> TaskServiceResult<Vec<Task>> {
        let count = items.len();

        let created = self
            .tasks
            .insert_many(owner, items)
            .await
            .map_err(|e| {
                tracing::warn!(user_id = %owner, count, error = %e, "Bulk create rejected");
                TaskServiceError::CreateFailed(e)
            })?;

        tracing::info!(user_id = %owner, count = created.len(), "Tasks created");
        Ok(created)
    }

    /// Non-deleted tasks of `owner`, newest first
    pub async fn list(&self, owner: Uuid) -> TaskServiceResult<Vec<Task>> {
        self.tasks
            .find_active(owner)
            .await
            .map_err(TaskServiceError::FetchFailed)
    }

    /// Applies the provided fields to one of `owner`'s tasks
    pub async fn update(&self, id: Uuid, owner: Uuid, changes: TaskChanges) -> TaskServiceResult<Task> {
        let updated = self
            .tasks
            .update_active(id, owner, changes)
            .await
            .map_err(TaskServiceError::UpdateFailed)?
            .ok_or(TaskServiceError::NotFound)?;

        tracing::debug!(task_id = %id, status = %updated.status, "Task updated");
        Ok(updated)
    }

    /// Soft-deletes one of `owner`'s tasks
    pub async fn delete(&self, id: Uuid, owner: Uuid) -> TaskServiceResult<()> {
        let deleted = self
            .tasks
            .soft_delete(id, owner)
            .await
            .map_err(TaskServiceError::DeleteFailed)?;

        if !deleted {
            return Err(TaskServiceError::NotFound);
        }

        tracing::info!(task_id = %id, user_id = %owner, "Task deleted");
        Ok(())
    }
}
