// ABOUTME: Core types, validation, and utilities for ManagMe
// ABOUTME: Foundational package shared across all ManagMe packages

pub mod constants;
pub mod id;
pub mod types;
pub mod validation;

// Re-export main types
pub use types::{
    Priority, Project, ProjectCreateInput, ProjectUpdateInput, Story, StoryCreateInput,
    StoryUpdateInput, Task, TaskCreateInput, TaskUpdateInput, User, UserRole, WorkState,
};

// Re-export constants
pub use constants::{managme_dir, STORE_VERSION};

// Re-export utilities
pub use id::{generate_local_id, generate_server_id};

// Re-export validation
pub use validation::{
    validate_project_create, validate_project_update, validate_story_create,
    validate_story_update, validate_task_create, validate_task_update, ValidationError,
};
