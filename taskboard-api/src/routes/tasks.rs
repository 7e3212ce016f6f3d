/// Task endpoints
///
/// Every handler acts on the caller's own tasks only; the owner is always
/// the token subject, never a request field.
///
/// # Endpoints
///
/// - `GET /tasks` - List active tasks, newest first
/// - `POST /tasks/bulk` - Create several tasks at once
/// - `PATCH /tasks/:id` - Update title, description or status
/// - `DELETE /tasks/:id` - Soft-delete a task

use crate::{
    app::AppState,
    error::{validate_request, ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::{NewTask, Task, TaskChanges, TaskStatus},
};
use uuid::Uuid;
use validator::Validate;

/// One item of a bulk create
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskItem {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Bulk create request
#[derive(Debug, Deserialize, Validate)]
pub struct BulkCreateRequest {
    #[validate(nested)]
    pub tasks: Vec<CreateTaskItem>,
}

/// Partial update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub status: Option<TaskStatus>,
}

/// `{ message, data }` envelope for mutations
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskEnvelope<T> {
    pub message: String,
    pub data: T,
}

/// Unparseable IDs cannot name an existing task
fn parse_task_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Task not found".to_string()))
}

/// List the caller's tasks
///
/// # Response
///
/// `200 OK` with an array of tasks, most recently created first.
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.tasks.list(auth.user_id).await?;
    Ok(Json(tasks))
}

/// Create tasks in bulk
///
/// # Endpoint
///
/// ```text
/// POST /tasks/bulk
/// Authorization: Bearer <token>
///
/// {
///   "tasks": [
///     { "title": "Buy groceries", "description": "Milk, Bread" },
///     { "title": "Call mom" }
///   ]
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "message": "2 tasks created successfully",
///   "data": [ ... ]
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or the batch was rejected (nothing
///   is persisted)
pub async fn create_bulk(
    State(state): State<AppState>,
    auth: AuthContext,
    body: Result<Json<BulkCreateRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskEnvelope<Vec<Task>>>)> {
    let Json(req) = body?;
    validate_request(&req)?;

    let items = req
        .tasks
        .into_iter()
        .map(|item| NewTask {
            title: item.title,
            description: item.description,
        })
        .collect();

    let created = state.tasks.create_bulk(auth.user_id, items).await?;

    Ok((
        StatusCode::CREATED,
        Json(TaskEnvelope {
            message: format!("{} tasks created successfully", created.len()),
            data: created,
        }),
    ))
}

/// Update one of the caller's tasks
///
/// Only the fields present in the body are changed.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `404 Not Found`: No such task, not the caller's, or already deleted
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<TaskEnvelope<Task>>> {
    let id = parse_task_id(&id)?;
    let Json(req) = body?;
    validate_request(&req)?;

    let changes = TaskChanges {
        title: req.title,
        description: req.description,
        status: req.status,
    };

    let task = state.tasks.update(id, auth.user_id, changes).await?;

    Ok(Json(TaskEnvelope {
        message: "Task updated successfully".to_string(),
        data: task,
    }))
}

/// Soft-delete one of the caller's tasks
///
/// # Response
///
/// `204 No Content`
///
/// # Errors
///
/// - `404 Not Found`: No such task, not the caller's, or already deleted
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_task_id(&id)?;

    state.tasks.delete(id, auth.user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_request_validates_each_item() {
        let req: BulkCreateRequest =
            serde_json::from_str(r#"{"tasks":[{"title":"ok"},{"title":""}]}"#).unwrap();
        assert!(req.validate().is_err());

        let req: BulkCreateRequest =
            serde_json::from_str(r#"{"tasks":[{"title":"A"},{"title":"B","description":"b"}]}"#)
                .unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_request_status_values() {
        let req: UpdateTaskRequest = serde_json::from_str(r#"{"status":"in-progress"}"#).unwrap();
        assert_eq!(req.status, Some(TaskStatus::InProgress));
        assert!(req.title.is_none());

        assert!(serde_json::from_str::<UpdateTaskRequest>(r#"{"status":"archived"}"#).is_err());
    }

    #[test]
    fn test_parse_task_id() {
        assert!(parse_task_id(&Uuid::new_v4().to_string()).is_ok());
        assert!(matches!(parse_task_id("64b7f0c2e1"), Err(ApiError::NotFound(_))));
    }
}
