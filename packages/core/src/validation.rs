use crate::types::{
    ProjectCreateInput, ProjectUpdateInput, StoryCreateInput, StoryUpdateInput, TaskCreateInput,
    TaskUpdateInput,
};
use serde::Serialize;

/// Validation error for a single field
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn require_non_empty(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::new(field, format!("{field} is required")));
    }
}

fn reject_empty(errors: &mut Vec<ValidationError>, field: &str, value: &Option<String>) {
    if let Some(value) = value {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(
                field,
                format!("{field} cannot be empty"),
            ));
        }
    }
}

fn check_estimated_time(errors: &mut Vec<ValidationError>, hours: f64) {
    if !hours.is_finite() || hours <= 0.0 {
        errors.push(ValidationError::new(
            "estimatedTime",
            "estimatedTime must be a positive number of hours",
        ));
    }
}

/// Validates project data for creation
pub fn validate_project_create(data: &ProjectCreateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    require_non_empty(&mut errors, "name", &data.name);
    require_non_empty(&mut errors, "description", &data.description);
    errors
}

/// Validates project update data
pub fn validate_project_update(data: &ProjectUpdateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    reject_empty(&mut errors, "name", &data.name);
    reject_empty(&mut errors, "description", &data.description);
    errors
}

/// Validates story data for creation
pub fn validate_story_create(data: &StoryCreateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    require_non_empty(&mut errors, "name", &data.name);
    require_non_empty(&mut errors, "description", &data.description);
    require_non_empty(&mut errors, "projectId", &data.project_id);
    require_non_empty(&mut errors, "ownerId", &data.owner_id);
    errors
}

/// Validates story update data
pub fn validate_story_update(data: &StoryUpdateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    reject_empty(&mut errors, "name", &data.name);
    reject_empty(&mut errors, "description", &data.description);
    errors
}

/// Validates task data for creation
pub fn validate_task_create(data: &TaskCreateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    require_non_empty(&mut errors, "name", &data.name);
    require_non_empty(&mut errors, "description", &data.description);
    require_non_empty(&mut errors, "storyId", &data.story_id);
    check_estimated_time(&mut errors, data.estimated_time);
    errors
}

/// Validates task update data
pub fn validate_task_update(data: &TaskUpdateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    reject_empty(&mut errors, "name", &data.name);
    reject_empty(&mut errors, "description", &data.description);
    if let Some(hours) = data.estimated_time {
        check_estimated_time(&mut errors, hours);
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Priority;

    #[test]
    fn valid_project_passes() {
        let data = ProjectCreateInput {
            name: "ManagMe".to_string(),
            description: "Project management app".to_string(),
        };
        assert!(validate_project_create(&data).is_empty());
    }

    #[test]
    fn empty_project_name_is_rejected() {
        let data = ProjectCreateInput {
            name: "  ".to_string(),
            description: "desc".to_string(),
        };
        let errors = validate_project_create(&data);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
    }

    #[test]
    fn project_update_allows_missing_fields() {
        let data = ProjectUpdateInput::default();
        assert!(validate_project_update(&data).is_empty());
    }

    #[test]
    fn story_create_requires_owner_and_project() {
        let data = StoryCreateInput {
            name: "Login".to_string(),
            description: "Login flow".to_string(),
            priority: Priority::High,
            project_id: String::new(),
            owner_id: String::new(),
        };
        let errors = validate_story_create(&data);
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["projectId", "ownerId"]);
    }

    #[test]
    fn task_estimated_time_must_be_positive() {
        let data = TaskCreateInput {
            name: "Wire form".to_string(),
            description: "desc".to_string(),
            priority: Priority::Low,
            story_id: "s1".to_string(),
            estimated_time: 0.0,
        };
        let errors = validate_task_create(&data);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "estimatedTime");

        let errors = validate_task_update(&TaskUpdateInput {
            estimated_time: Some(-2.0),
            ..Default::default()
        });
        assert_eq!(errors.len(), 1);
    }
}
