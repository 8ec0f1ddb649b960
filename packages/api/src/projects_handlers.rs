// ABOUTME: HTTP request handlers for project operations
// ABOUTME: Handles CRUD and search for projects backed by the document store

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::response::{ensure_valid, ApiError, ApiResponse};
use crate::ApiState;
use managme_core::types::{ProjectCreateInput, ProjectUpdateInput};
use managme_core::validation::{validate_project_create, validate_project_update};
use managme_storage::StoreError;

pub async fn list_projects(State(store): State<ApiState>) -> impl IntoResponse {
    Json(ApiResponse::success(store.list_projects().await))
}

pub async fn get_project(
    State(store): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let project = store.get_project(&id).await.ok_or(StoreError::NotFound)?;
    Ok(Json(ApiResponse::success(project)))
}

pub async fn create_project(
    State(store): State<ApiState>,
    Json(input): Json<ProjectCreateInput>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_valid(validate_project_create(&input))?;

    let project = store.create_project(input).await?;
    info!(id = %project.id, name = %project.name, "Project created");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(project))))
}

pub async fn update_project(
    State(store): State<ApiState>,
    Path(id): Path<String>,
    Json(input): Json<ProjectUpdateInput>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_valid(validate_project_update(&input))?;

    let project = store.update_project(&id, input).await?;
    Ok(Json(ApiResponse::success(project)))
}

/// Deleting an id that does not exist answers `data: false` rather than 404.
pub async fn delete_project(
    State(store): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = store.delete_project(&id).await?;
    if deleted {
        info!(id = %id, "Project deleted");
    }
    Ok(Json(ApiResponse::success(deleted)))
}

pub async fn search_projects(
    State(store): State<ApiState>,
    Path(term): Path<String>,
) -> impl IntoResponse {
    Json(ApiResponse::success(store.search_projects(&term).await))
}

pub async fn project_stories(
    State(store): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    Json(ApiResponse::success(store.stories_by_project(&id).await))
}
