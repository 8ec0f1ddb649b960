// ABOUTME: HTTP request handlers for task operations
// ABOUTME: CRUD plus the lifecycle actions: assign moves todo to doing, complete moves doing to done

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::response::{ensure_valid, ApiError, ApiResponse};
use crate::ApiState;
use managme_core::types::{TaskCreateInput, TaskUpdateInput, WorkState};
use managme_core::validation::{validate_task_create, validate_task_update};
use managme_storage::StoreError;

pub async fn list_tasks(State(store): State<ApiState>) -> impl IntoResponse {
    Json(ApiResponse::success(store.list_tasks().await))
}

pub async fn get_task(
    State(store): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let task = store.get_task(&id).await.ok_or(StoreError::NotFound)?;
    Ok(Json(ApiResponse::success(task)))
}

pub async fn create_task(
    State(store): State<ApiState>,
    Json(input): Json<TaskCreateInput>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_valid(validate_task_create(&input))?;

    let task = store.create_task(input).await?;
    info!(id = %task.id, story_id = %task.story_id, "Task created");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(task))))
}

pub async fn update_task(
    State(store): State<ApiState>,
    Path(id): Path<String>,
    Json(input): Json<TaskUpdateInput>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_valid(validate_task_update(&input))?;

    let task = store.update_task(&id, input).await?;
    Ok(Json(ApiResponse::success(task)))
}

pub async fn delete_task(
    State(store): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = store.delete_task(&id).await?;
    Ok(Json(ApiResponse::success(deleted)))
}

pub async fn tasks_by_state(
    State(store): State<ApiState>,
    Path(state): Path<WorkState>,
) -> impl IntoResponse {
    Json(ApiResponse::success(store.tasks_by_state(state).await))
}

/// Request body for assigning a user to a task
#[derive(Deserialize)]
pub struct AssignTaskRequest {
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Assign a user to a todo task. Rejected with 409 when the task is not
/// in todo, and 400 when the user is not assignable.
pub async fn assign_task(
    State(store): State<ApiState>,
    Path(id): Path<String>,
    Json(request): Json<AssignTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let task = store.assign_task(&id, &request.user_id).await?;
    info!(task_id = %id, user_id = %request.user_id, "Task assigned");
    Ok(Json(ApiResponse::success(task)))
}

/// Complete a doing task. Rejected with 409 otherwise.
pub async fn complete_task(
    State(store): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let task = store.complete_task(&id).await?;
    info!(task_id = %id, "Task completed");
    Ok(Json(ApiResponse::success(task)))
}
