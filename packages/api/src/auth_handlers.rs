// ABOUTME: HTTP request handlers for the token service
// ABOUTME: Login, refresh, logout and the current-user endpoint with bare JSON bodies

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::middleware::AuthenticatedUser;
use crate::AuthState;
use managme_auth::AuthError;

fn bare_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

/// Unknown logins and wrong passwords get the same answer.
pub async fn login(State(auth): State<AuthState>, Json(request): Json<LoginRequest>) -> Response {
    match auth.login(&request.login, &request.password).await {
        Ok(outcome) => {
            info!(user_id = %outcome.user.id, "User logged in");
            Json(outcome).into_response()
        }
        Err(AuthError::InvalidCredentials) => {
            warn!(login = %request.login, "Failed login attempt");
            bare_error(StatusCode::UNAUTHORIZED, "Invalid login or password")
        }
        Err(e) => {
            warn!(error = %e, "Login failed");
            bare_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    #[serde(rename = "refreshToken")]
    pub refresh_token: Option<String>,
}

/// A missing token is 401; a token that is revoked, forged or expired is 403.
pub async fn refresh(
    State(auth): State<AuthState>,
    Json(request): Json<RefreshRequest>,
) -> Response {
    let refresh_token = match request.refresh_token {
        Some(token) => token,
        None => return bare_error(StatusCode::UNAUTHORIZED, "Refresh token required"),
    };

    match auth.refresh(&refresh_token).await {
        Ok(token) => Json(json!({ "token": token })).into_response(),
        Err(e) => {
            warn!(error = %e, "Refresh rejected");
            bare_error(StatusCode::FORBIDDEN, "Invalid refresh token")
        }
    }
}

#[derive(Deserialize)]
pub struct LogoutRequest {
    #[serde(rename = "refreshToken")]
    pub refresh_token: Option<String>,
}

/// Revokes the posted refresh token. Unknown tokens are a no-op.
pub async fn logout(
    State(auth): State<AuthState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    Json(request): Json<LogoutRequest>,
) -> Response {
    if let Some(refresh_token) = request.refresh_token {
        auth.logout(&refresh_token).await;
    }
    info!(user_id = %user_id, "User logged out");
    Json(json!({ "message": "Logged out" })).into_response()
}

pub async fn me(
    State(auth): State<AuthState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> Response {
    match auth.user_by_id(&user_id) {
        Some(user) => Json(user).into_response(),
        None => bare_error(StatusCode::NOT_FOUND, "User not found"),
    }
}
