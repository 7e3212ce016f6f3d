/// In-memory store backend
///
/// Mirrors the PostgreSQL backend's semantics (unique emails, non-blank
/// titles, all-or-nothing batches, owner-scoped filtered updates) behind a
/// single `RwLock`, so every operation is atomic with respect to the others.
/// Used for local development (`STORE_BACKEND=memory`) and by the test
/// suites.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Datastore, StoreError, StoreResult, TaskStore, UserStore};
use crate::models::{NewTask, NewUser, Task, TaskChanges, User};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    /// Insertion order; also the tiebreak for equal timestamps
    tasks: Vec<Task>,
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored task of `owner`, soft-deleted ones included
    pub async fn all_tasks_of(&self, owner: Uuid) -> Vec<Task> {
        let inner = self.inner.read().await;
        inner
            .tasks
            .iter()
            .filter(|t| t.user_id == owner)
            .cloned()
            .collect()
    }
}

fn check_title(title: &str) -> StoreResult<()> {
    if title.trim().is_empty() {
        return Err(StoreError::Rejected("title must not be empty".to_string()));
    }
    Ok(())
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn create(&self, data: NewUser) -> StoreResult<User> {
        if data.name.is_empty() {
            return Err(StoreError::Rejected("name must not be empty".to_string()));
        }

        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == data.email) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            role: data.role,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let inner = self.inner.read().await;
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_many(&self, owner: Uuid, tasks: Vec<NewTask>) -> StoreResult<Vec<Task>> {
        // Validate the whole batch before touching state
        for task in &tasks {
            check_title(&task.title)?;
        }

        let mut inner = self.inner.write().await;
        let created: Vec<Task> = tasks
            .into_iter()
            .map(|task| {
                let now = Utc::now();
                Task {
                    id: Uuid::new_v4(),
                    user_id: owner,
                    title: task.title,
                    description: task.description,
                    status: Default::default(),
                    is_deleted: false,
                    created_at: now,
                    updated_at: now,
                }
            })
            .collect();
        inner.tasks.extend(created.iter().cloned());

        Ok(created)
    }

    async fn find_active(&self, owner: Uuid) -> StoreResult<Vec<Task>> {
        let inner = self.inner.read().await;
        let mut tasks: Vec<Task> = inner
            .tasks
            .iter()
            .rev()
            .filter(|t| t.user_id == owner && !t.is_deleted)
            .cloned()
            .collect();
        // Stable sort keeps newest-inserted first among equal timestamps
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn update_active(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: TaskChanges,
    ) -> StoreResult<Option<Task>> {
        let mut inner = self.inner.write().await;
        let Some(task) = inner
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == owner && !t.is_deleted)
        else {
            return Ok(None);
        };

        if let Some(ref title) = changes.title {
            check_title(title)?;
        }

        if let Some(title) = changes.title {
            task.title = title;
        }
        if let Some(description) = changes.description {
            task.description = Some(description);
        }
        if let Some(status) = changes.status {
            task.status = status;
        }
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn soft_delete(&self, id: Uuid, owner: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        match inner
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == owner && !t.is_deleted)
        {
            Some(task) => {
                task.is_deleted = true;
                task.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
