// ABOUTME: Bearer token middleware for the token service endpoints
// ABOUTME: Verifies the access token and injects the resolved user id into the request

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::warn;

use crate::AuthState;

/// User id resolved from a verified access token, available to protected
/// handlers as a request extension.
#[derive(Clone)]
pub struct AuthenticatedUser(pub String);

fn bare_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Missing or malformed headers are 401; a present token that fails
/// signature or expiry verification is 403.
pub async fn require_auth(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = match header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => {
            warn!(path = %request.uri().path(), "Missing bearer token");
            return bare_error(
                StatusCode::UNAUTHORIZED,
                "Authorization header with a bearer token is required",
            );
        }
    };

    match auth.verify_access(token) {
        Ok(user_id) => {
            request.extensions_mut().insert(AuthenticatedUser(user_id));
            next.run(request).await
        }
        Err(e) => {
            warn!(error = %e, "Access token rejected");
            bare_error(StatusCode::FORBIDDEN, "Invalid or expired token")
        }
    }
}
