/// PostgreSQL store backend
///
/// Implements the store traits with sqlx against the schema in
/// `taskboard-shared/migrations/`. Owner scoping and the soft-delete filter
/// live in the `WHERE` clause of each statement, so match-and-mutate is a
/// single atomic `UPDATE ... RETURNING`.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskboard_shared::store::{postgres::PgStore, TaskStore};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let store = PgStore::new(pool);
/// let tasks = store.find_active(Uuid::new_v4()).await?;
/// assert!(tasks.is_empty());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{Datastore, StoreResult, TaskStore, UserStore};
use crate::models::{NewTask, NewUser, Task, TaskChanges, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

const TASK_COLUMNS: &str =
    "id, user_id, title, description, status, is_deleted, created_at, updated_at";

/// sqlx-backed store sharing one connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, data: NewUser) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_many(&self, owner: Uuid, tasks: Vec<NewTask>) -> StoreResult<Vec<Task>> {
        let insert = format!(
            r#"
            INSERT INTO tasks (user_id, title, description)
            VALUES ($1, $2, $3)
            RETURNING {TASK_COLUMNS}
            "#
        );

        // Dropping the transaction on an early return rolls the batch back.
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(tasks.len());

        for task in tasks {
            let row = sqlx::query_as::<_, Task>(&insert)
                .bind(owner)
                .bind(task.title)
                .bind(task.description)
                .fetch_one(&mut *tx)
                .await?;
            created.push(row);
        }

        tx.commit().await?;

        debug!(user_id = %owner, count = created.len(), "Inserted task batch");
        Ok(created)
    }

    async fn find_active(&self, owner: Uuid) -> StoreResult<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE user_id = $1 AND is_deleted = FALSE
            ORDER BY created_at DESC
            "#
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn update_active(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: TaskChanges,
    ) -> StoreResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET title = COALESCE($3, title),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                updated_at = clock_timestamp()
            WHERE id = $1 AND user_id = $2 AND is_deleted = FALSE
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn soft_delete(&self, id: Uuid, owner: Uuid) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET is_deleted = TRUE,
                updated_at = clock_timestamp()
            WHERE id = $1 AND user_id = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Datastore for PgStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        crate::db::pool::health_check(&self.pool).await?;
        Ok(())
    }
}
