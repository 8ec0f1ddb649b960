// ABOUTME: HTTP request handlers for the read-only user roster
// ABOUTME: The roster is seeded at startup; there is no registration endpoint

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use crate::response::{ApiError, ApiResponse};
use crate::ApiState;
use managme_storage::StoreError;

pub async fn list_users(State(store): State<ApiState>) -> impl IntoResponse {
    Json(ApiResponse::success(store.list_users().await))
}

/// Users eligible for task assignment (developer and devops roles).
pub async fn assignable_users(State(store): State<ApiState>) -> impl IntoResponse {
    Json(ApiResponse::success(store.assignable_users().await))
}

pub async fn get_user(
    State(store): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = store.get_user(&id).await.ok_or(StoreError::NotFound)?;
    Ok(Json(ApiResponse::success(user)))
}
