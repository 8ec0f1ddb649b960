// ABOUTME: Entity services for ManagMe: remote-first CRUD with sticky local fallback
// ABOUTME: Holds the task lifecycle rules and the explicit backend state machine

pub mod active_project;
pub mod backend;
pub mod project;
pub mod story;
pub mod task;
pub mod user;

pub use active_project::ActiveProjectService;
pub use backend::{BackendMode, BackendState};
pub use project::ProjectService;
pub use story::{StoryLookup, StoryService};
pub use task::TaskService;
pub use user::UserService;

use managme_client::RemoteError;
use managme_core::types::WorkState;
use managme_storage::StoreError;
use thiserror::Error;

/// Service-layer errors.
///
/// Backend-unavailable failures (transport errors, 5xx answers) never
/// appear here: they demote the backend and the operation is served
/// locally instead.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Remote(RemoteError),
    #[error("record not found")]
    NotFound,
    #[error("invalid transition: task is {from}, expected {expected}")]
    InvalidTransition {
        from: WorkState,
        expected: WorkState,
    },
    #[error("user '{0}' cannot be assigned to tasks")]
    NotAssignable(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Maps a non-transport remote error onto the service error space.
pub(crate) fn map_remote(error: RemoteError) -> ServiceError {
    match error {
        RemoteError::Status { status: 404, .. } => ServiceError::NotFound,
        other => ServiceError::Remote(other),
    }
}
