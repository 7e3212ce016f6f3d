/// Persistence contracts and backends
///
/// The Auth and Task components only see the traits in this module. Two
/// backends implement them:
///
/// - [`postgres::PgStore`]: sqlx over a PostgreSQL pool (production)
/// - [`memory::MemoryStore`]: in-process maps (local development and tests)
///
/// Every task read or write is owner-scoped: the owner ID and the
/// `is_deleted = false` condition are part of the same filtered operation as
/// the mutation, never a separate existence check.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskboard_shared::models::NewTask;
/// use taskboard_shared::store::{memory::MemoryStore, TaskStore};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryStore::new());
/// let owner = Uuid::new_v4();
///
/// store.insert_many(owner, vec![NewTask::new("Buy milk")]).await?;
/// let tasks = store.find_active(owner).await?;
/// assert_eq!(tasks.len(), 1);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::error::ErrorKind;
use uuid::Uuid;

use crate::models::{NewTask, NewUser, Task, TaskChanges, User};

pub mod memory;
pub mod postgres;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated (e.g. duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The store refused the data (constraint or validation failure)
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    let constraint = db_err.constraint().unwrap_or("unique").to_string();
                    return StoreError::Conflict(constraint);
                }
                ErrorKind::CheckViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation => {
                    return StoreError::Rejected(db_err.message().to_string());
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Credential store
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by exact email
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Finds a user by ID
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Persists a new user
    ///
    /// Fails with [`StoreError::Conflict`] if the email is taken.
    async fn create(&self, user: NewUser) -> StoreResult<User>;

    /// Lists all users, newest first
    async fn list(&self) -> StoreResult<Vec<User>>;
}

/// Task store
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a batch of tasks for `owner`
    ///
    /// All-or-nothing: if any item is rejected, nothing is persisted.
    /// Returned tasks are in input order.
    async fn insert_many(&self, owner: Uuid, tasks: Vec<NewTask>) -> StoreResult<Vec<Task>>;

    /// Non-deleted tasks of `owner`, most recently created first
    async fn find_active(&self, owner: Uuid) -> StoreResult<Vec<Task>>;

    /// Applies `changes` to the matching non-deleted task of `owner`
    ///
    /// Returns `None` when no task matches `(id, owner, not deleted)`.
    async fn update_active(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: TaskChanges,
    ) -> StoreResult<Option<Task>>;

    /// Sets `is_deleted` on the matching non-deleted task of `owner`
    ///
    /// Returns `false` when no task matches.
    async fn soft_delete(&self, id: Uuid, owner: Uuid) -> StoreResult<bool>;
}

/// A complete backend: both stores plus a liveness probe
#[async_trait]
pub trait Datastore: UserStore + TaskStore {
    /// Short name for logs and health output
    fn backend_name(&self) -> &'static str;

    /// Checks the backend is reachable
    async fn ping(&self) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Conflict("users_email_key".to_string());
        assert_eq!(err.to_string(), "Conflict: users_email_key");

        let err = StoreError::Rejected("title must not be empty".to_string());
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_row_not_found_is_database_error() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
    }
}
