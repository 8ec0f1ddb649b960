// ABOUTME: HTTP request handlers for story operations
// ABOUTME: Stories belong to a project and group the tasks under them

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::response::{ensure_valid, ApiError, ApiResponse};
use crate::ApiState;
use managme_core::types::{StoryCreateInput, StoryUpdateInput};
use managme_core::validation::{validate_story_create, validate_story_update};
use managme_storage::StoreError;

pub async fn list_stories(State(store): State<ApiState>) -> impl IntoResponse {
    Json(ApiResponse::success(store.list_stories().await))
}

pub async fn get_story(
    State(store): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let story = store.get_story(&id).await.ok_or(StoreError::NotFound)?;
    Ok(Json(ApiResponse::success(story)))
}

pub async fn create_story(
    State(store): State<ApiState>,
    Json(input): Json<StoryCreateInput>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_valid(validate_story_create(&input))?;

    let story = store.create_story(input).await?;
    info!(id = %story.id, project_id = %story.project_id, "Story created");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(story))))
}

pub async fn update_story(
    State(store): State<ApiState>,
    Path(id): Path<String>,
    Json(input): Json<StoryUpdateInput>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_valid(validate_story_update(&input))?;

    let story = store.update_story(&id, input).await?;
    Ok(Json(ApiResponse::success(story)))
}

pub async fn delete_story(
    State(store): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = store.delete_story(&id).await?;
    Ok(Json(ApiResponse::success(deleted)))
}

pub async fn story_tasks(
    State(store): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    Json(ApiResponse::success(store.tasks_by_story(&id).await))
}
