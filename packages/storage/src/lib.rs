// ABOUTME: Persistence for ManagMe: local JSON collections and the server store
// ABOUTME: Both adapters write pretty JSON under a caller-supplied directory

use managme_core::types::{Project, Story, Task, User, WorkState};
use thiserror::Error;

pub mod json;
pub mod local;
pub mod server;

pub use local::{LocalStore, Session};
pub use server::DataStore;

/// Storage errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("record not found")]
    NotFound,
    #[error("invalid transition: task is {0}, expected {1}")]
    InvalidTransition(WorkState, WorkState),
    #[error("user '{0}' cannot be assigned to tasks")]
    NotAssignable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Anything stored in an id-keyed collection
pub trait HasId {
    fn id(&self) -> &str;
}

impl HasId for Project {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for Story {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for Task {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for User {
    fn id(&self) -> &str {
        &self.id
    }
}
