//! `/todos` endpoint handlers.
//!
//! Each handler validates transport-level input (body shape, id syntax),
//! runs exactly one service call on the blocking pool, and wraps the outcome
//! in an [`Envelope`].

use crate::error::{ApiError, Operation};
use crate::routes::{AppState, SharedStore};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use todo_core::{Envelope, ServiceResult, Task, TaskId, TaskPatch, TaskService};
use uuid::Uuid;

type ApiResult = Result<(StatusCode, Json<Envelope<Task>>), ApiError>;

/// Body of `POST /todos`. `task` stays optional so a missing field reports
/// as invalid input instead of a generic deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub task: Option<String>,
}

/// GET /todos
pub async fn list_tasks<S: SharedStore>(
    State(state): State<AppState<S>>,
) -> Result<(StatusCode, Json<Envelope<Vec<Task>>>), ApiError> {
    let tasks = run_blocking(&state, Operation::List, |service| service.list()).await?;
    Ok((
        StatusCode::OK,
        Json(Envelope::success(Operation::List.success_message(), tasks)),
    ))
}

/// POST /todos
pub async fn create_task<S: SharedStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) =
        payload.map_err(|rejection| ApiError::invalid_input(rejection.body_text()))?;
    let task = run_blocking(&state, Operation::Create, move |service| {
        service.create(request.task.as_deref())
    })
    .await?;
    Ok(respond(StatusCode::CREATED, Operation::Create, task))
}

/// PUT /todos/{id}
pub async fn update_task<S: SharedStore>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> ApiResult {
    let id = parse_task_id(&raw_id)?;
    let Json(patch) =
        payload.map_err(|rejection| ApiError::invalid_input(rejection.body_text()))?;
    let task = run_blocking(&state, Operation::Update, move |service| {
        service.update(id, &patch)
    })
    .await?;
    Ok(respond(StatusCode::OK, Operation::Update, task))
}

/// DELETE /todos/{id}
pub async fn delete_task<S: SharedStore>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
) -> ApiResult {
    let id = parse_task_id(&raw_id)?;
    let task = run_blocking(&state, Operation::Delete, move |service| service.delete(id)).await?;
    Ok(respond(StatusCode::OK, Operation::Delete, task))
}

/// GET /
pub async fn root() -> &'static str {
    "api is running"
}

// A string that is not a UUID cannot name any stored task.
fn parse_task_id(raw: &str) -> Result<TaskId, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(format!("no todo with id {raw}")))
}

fn respond(
    status: StatusCode,
    operation: Operation,
    task: Task,
) -> (StatusCode, Json<Envelope<Task>>) {
    (
        status,
        Json(Envelope::success(operation.success_message(), task)),
    )
}

async fn run_blocking<S, T, F>(
    state: &AppState<S>,
    operation: Operation,
    call: F,
) -> Result<T, ApiError>
where
    S: SharedStore,
    T: Send + 'static,
    F: FnOnce(&TaskService<S>) -> ServiceResult<T> + Send + 'static,
{
    let service = Arc::clone(&state.service);
    match tokio::task::spawn_blocking(move || call(service.as_ref())).await {
        Ok(result) => result.map_err(|err| ApiError::from_service(operation, err)),
        Err(join_err) => Err(ApiError::internal(operation, join_err.to_string())),
    }
}
