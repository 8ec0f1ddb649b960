// ABOUTME: HTTP clients for ManagMe: the domain API adapter and the auth client
// ABOUTME: Transport failures and rejected requests are distinct error variants

pub mod auth;
pub mod remote;

pub use auth::{AuthClient, AuthClientError};
pub use remote::RemoteClient;

use serde::Deserialize;
use thiserror::Error;

/// Errors from the remote domain API adapter.
///
/// `Http` means the backend could not be reached at all; `Status` means
/// the backend answered and said no. `is_unavailable` decides which of
/// these trigger the service-layer fallback.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("server response carried no data")]
    EmptyEnvelope,
}

impl RemoteError {
    /// True when the backend cannot serve requests at all: a transport
    /// failure, or a 5xx answer. Client-side errors (4xx) mean the
    /// backend is alive and judging the request.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            RemoteError::Http(_)
                | RemoteError::Status {
                    status: 500..=599,
                    ..
                }
        )
    }
}

/// The `{success, data, error}` envelope the domain API wraps bodies in
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[allow(dead_code)]
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}
