//! Task CRUD handlers and the task wire format.
//!
//! The wire format keeps the contract of the service this replaces:
//! `dueDate` carries a trailing lowercase `z`, the audit stamps an uppercase
//! `Z`, and timestamps missing from a stored record default to the
//! serialization instant rather than being backfilled in the store.

use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::{Error, NewTask, Task, TaskChanges, TaskId, DEFAULT_TASK_STATUS};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Request body for `POST /api/tasks`.
///
/// Unknown fields are rejected so server-owned stamps (`completed`,
/// `created_at`, `updated_at`) cannot be smuggled in at creation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateTaskRequest {
    /// Required task text.
    pub text: Option<String>,
    /// Free-form description, defaults to empty.
    #[serde(default)]
    pub description: Option<String>,
    /// Workflow status, defaults to `"Pending"`.
    #[serde(default)]
    pub status: Option<String>,
    /// Optional ISO-8601 due date.
    #[serde(rename = "dueDate", default)]
    pub due_date: Option<String>,
}

/// Request body for `PUT /api/tasks/{id}`.
///
/// All fields are optional; absent fields keep their stored value. There is
/// no `created_at` here: the creation stamp is immutable, and unknown fields
/// are rejected.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskRequest {
    /// Replacement task text.
    pub text: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement status label.
    pub status: Option<String>,
    /// Replacement completion flag.
    pub completed: Option<bool>,
    /// Replacement ISO-8601 due date.
    #[serde(rename = "dueDate")]
    pub due_date: Option<String>,
}

/// Wire form of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaskResponse {
    /// Hex-encoded store identity.
    pub id: String,
    /// Task text.
    pub text: String,
    /// Free-form description.
    pub description: String,
    /// Completion flag.
    pub completed: bool,
    /// Workflow status.
    pub status: String,
    /// ISO-8601 due date with a trailing lowercase `z`.
    #[serde(rename = "dueDate")]
    pub due_date: String,
    /// ISO-8601 creation stamp with a trailing uppercase `Z`.
    pub created_at: String,
    /// ISO-8601 modification stamp with a trailing uppercase `Z`.
    pub updated_at: String,
}

fn format_stamp(stamp: DateTime<Utc>, suffix: char) -> String {
    format!("{}{}", stamp.format("%Y-%m-%dT%H:%M:%S%.6f"), suffix)
}

impl TaskResponse {
    /// Serialize a task, defaulting missing timestamps to `now`.
    ///
    /// A record genuinely missing a stamp therefore shows a different value
    /// on every read; the store is never backfilled.
    pub fn from_task(task: Task, now: DateTime<Utc>) -> Self {
        Self {
            id: task.id.as_str().to_owned(),
            text: task.text,
            description: task.description,
            completed: task.completed,
            status: task.status,
            due_date: format_stamp(task.due_date.unwrap_or(now), 'z'),
            created_at: format_stamp(task.created_at.unwrap_or(now), 'Z'),
            updated_at: format_stamp(task.updated_at.unwrap_or(now), 'Z'),
        }
    }
}

/// Parse a caller-supplied timestamp.
///
/// Accepts RFC 3339 as well as the naive `YYYY-MM-DDTHH:MM:SS[.ffffff]`
/// shape this service itself emits, with or without the trailing `z`/`Z`.
fn parse_client_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    let trimmed = raw.strip_suffix(['z', 'Z']).unwrap_or(raw);
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn parse_due_date(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, Error> {
    raw.map(|value| {
        parse_client_timestamp(value)
            .ok_or_else(|| Error::invalid_request("dueDate must be an ISO-8601 timestamp"))
    })
    .transpose()
}

fn task_not_found() -> Error {
    Error::not_found("Task not found")
}

// Malformed ids surface as 404 to keep the task contract, but are logged
// distinctly from a genuine miss.
fn parse_task_id(raw: &str) -> Result<TaskId, Error> {
    TaskId::parse(raw).map_err(|err| {
        debug!(id = raw, error = %err, "malformed task id");
        task_not_found()
    })
}

/// List every task in store iteration order.
#[utoipa::path(
    get,
    path = "/api/tasks",
    responses(
        (status = 200, description = "All tasks", body = [TaskResponse]),
        (status = 500, description = "Internal server error")
    ),
    tags = ["tasks"],
    operation_id = "listTasks"
)]
#[get("/api/tasks")]
pub async fn list_tasks(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<TaskResponse>>> {
    let tasks = state.tasks.list().await?;
    let now = Utc::now();
    Ok(web::Json(
        tasks
            .into_iter()
            .map(|task| TaskResponse::from_task(task, now))
            .collect(),
    ))
}

/// Create a task, stamping the server-owned fields, and return the stored
/// record as read back from the store.
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Created task", body = TaskResponse),
        (status = 400, description = "Missing text or malformed body"),
        (status = 500, description = "Internal server error")
    ),
    tags = ["tasks"],
    operation_id = "createTask"
)]
#[post("/api/tasks")]
pub async fn create_task(
    state: web::Data<HttpState>,
    payload: web::Json<CreateTaskRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let text = payload
        .text
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| Error::invalid_request("text is required"))?;
    let due_date = parse_due_date(payload.due_date.as_deref())?;

    let task = NewTask::new(
        text,
        payload.description.unwrap_or_default(),
        payload
            .status
            .unwrap_or_else(|| DEFAULT_TASK_STATUS.to_owned()),
        due_date,
        Utc::now(),
    );
    let id = state.tasks.insert(task).await?;
    let stored = state
        .tasks
        .find(&id)
        .await?
        .ok_or_else(|| Error::internal("inserted task missing at read-back"))?;
    Ok(HttpResponse::Created().json(TaskResponse::from_task(stored, Utc::now())))
}

/// Fetch a single task.
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Hex-encoded task identity")),
    responses(
        (status = 200, description = "The task", body = TaskResponse),
        (status = 404, description = "No such task"),
        (status = 500, description = "Internal server error")
    ),
    tags = ["tasks"],
    operation_id = "getTask"
)]
#[get("/api/tasks/{id}")]
pub async fn get_task(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<TaskResponse>> {
    let id = parse_task_id(&path)?;
    let task = state.tasks.find(&id).await?.ok_or_else(task_not_found)?;
    Ok(web::Json(TaskResponse::from_task(task, Utc::now())))
}

/// Apply a field-level merge to a task.
///
/// A body that matches the stored values is a no-op and still returns the
/// current record; only a missing record yields 404.
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Hex-encoded task identity")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Updated task", body = TaskResponse),
        (status = 400, description = "Malformed body"),
        (status = 404, description = "No such task"),
        (status = 500, description = "Internal server error")
    ),
    tags = ["tasks"],
    operation_id = "updateTask"
)]
#[put("/api/tasks/{id}")]
pub async fn update_task(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateTaskRequest>,
) -> ApiResult<web::Json<TaskResponse>> {
    let id = parse_task_id(&path)?;
    let payload = payload.into_inner();
    let changes = TaskChanges {
        text: payload.text,
        description: payload.description,
        status: payload.status,
        completed: payload.completed,
        due_date: parse_due_date(payload.due_date.as_deref())?,
        // Refreshed on every update, whether or not anything else changed.
        updated_at: Some(Utc::now()),
    };

    let outcome = state.tasks.update(&id, changes).await?;
    if !outcome.matched {
        return Err(task_not_found());
    }
    let task = state.tasks.find(&id).await?.ok_or_else(task_not_found)?;
    Ok(web::Json(TaskResponse::from_task(task, Utc::now())))
}

/// Delete a task.
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Hex-encoded task identity")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "No such task"),
        (status = 500, description = "Internal server error")
    ),
    tags = ["tasks"],
    operation_id = "deleteTask"
)]
#[delete("/api/tasks/{id}")]
pub async fn delete_task(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_task_id(&path)?;
    if state.tasks.delete(&id).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(task_not_found())
    }
}
