// ABOUTME: Shared API response types and error handling
// ABOUTME: Provides consistent response format across all API endpoints

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use managme_core::validation::ValidationError;
use managme_storage::StoreError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Errors a handler can surface to the client.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<ValidationError>),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<Vec<ValidationError>> for ApiError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(errors) => {
                let message = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join("; ");
                (StatusCode::BAD_REQUEST, message)
            }
            ApiError::Store(StoreError::NotFound) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Store(StoreError::InvalidTransition { .. }) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            ApiError::Store(StoreError::NotAssignable(_)) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::Store(e) => {
                error!(error = %e, "Store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, ResponseJson(ApiResponse::<()>::error(message))).into_response()
    }
}

/// Checks a validation result, turning collected field errors into a 400.
pub fn ensure_valid(errors: Vec<ValidationError>) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}
