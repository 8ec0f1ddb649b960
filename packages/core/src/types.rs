use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Roles a user can hold
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Developer,
    Devops,
}

impl UserRole {
    /// Only developers and devops may be assigned to tasks
    pub fn is_assignable(&self) -> bool {
        matches!(self, UserRole::Developer | UserRole::Devops)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Developer => write!(f, "developer"),
            UserRole::Devops => write!(f, "devops"),
        }
    }
}

/// Priority levels for stories and tasks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

/// Workflow states for stories and tasks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorkState {
    Todo,
    Doing,
    Done,
}

impl Default for WorkState {
    fn default() -> Self {
        WorkState::Todo
    }
}

impl fmt::Display for WorkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkState::Todo => write!(f, "todo"),
            WorkState::Doing => write!(f, "doing"),
            WorkState::Done => write!(f, "done"),
        }
    }
}

/// A user account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub role: UserRole,
}

/// A project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// A story within a project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Story {
    pub id: String,
    pub name: String,
    pub description: String,
    pub priority: Priority,
    pub state: WorkState,
    #[serde(rename = "projectId")]
    pub project_id: String,
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// A task within a story, assignable to one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: String,
    pub priority: Priority,
    pub state: WorkState,
    #[serde(rename = "storyId")]
    pub story_id: String,
    #[serde(rename = "estimatedTime")]
    pub estimated_time: f64,
    #[serde(rename = "assignedUserId")]
    pub assigned_user_id: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(rename = "endDate")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Elapsed working time in hours, rounded to one decimal.
    /// Only meaningful once the task is done and both stamps exist.
    pub fn elapsed_hours(&self) -> Option<f64> {
        let start = self.start_date?;
        let end = self.end_date?;
        let hours = (end - start).num_seconds() as f64 / 3600.0;
        Some((hours * 10.0).round() / 10.0)
    }
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectCreateInput {
    pub name: String,
    pub description: String,
}

/// Input for updating an existing project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectUpdateInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Input for creating a new story
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoryCreateInput {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(rename = "projectId")]
    pub project_id: String,
    #[serde(rename = "ownerId")]
    pub owner_id: String,
}

/// Input for updating an existing story
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoryUpdateInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub state: Option<WorkState>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskCreateInput {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(rename = "storyId")]
    pub story_id: String,
    #[serde(rename = "estimatedTime")]
    pub estimated_time: f64,
}

/// Input for updating an existing task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskUpdateInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    #[serde(rename = "estimatedTime")]
    pub estimated_time: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn sample_task() -> Task {
        Task {
            id: "t1".to_string(),
            name: "Wire login form".to_string(),
            description: "Hook the form to the auth client".to_string(),
            priority: Priority::High,
            state: WorkState::Todo,
            story_id: "s1".to_string(),
            estimated_time: 4.0,
            assigned_user_id: None,
            start_date: None,
            end_date: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn elapsed_hours_requires_both_stamps() {
        let mut task = sample_task();
        assert_eq!(task.elapsed_hours(), None);

        task.start_date = Some(Utc::now());
        assert_eq!(task.elapsed_hours(), None);
    }

    #[test]
    fn elapsed_hours_rounds_to_one_decimal() {
        let mut task = sample_task();
        let start = Utc::now();
        task.start_date = Some(start);
        task.end_date = Some(start + Duration::minutes(90));
        assert_eq!(task.elapsed_hours(), Some(1.5));

        task.end_date = Some(start + Duration::minutes(100));
        // 1h40m = 1.666... -> 1.7
        assert_eq!(task.elapsed_hours(), Some(1.7));
    }

    #[test]
    fn assignable_roles() {
        assert!(!UserRole::Admin.is_assignable());
        assert!(UserRole::Developer.is_assignable());
        assert!(UserRole::Devops.is_assignable());
    }

    #[test]
    fn wire_format_uses_camel_case() {
        let story = Story {
            id: "s1".to_string(),
            name: "Auth".to_string(),
            description: "Login flow".to_string(),
            priority: Priority::Medium,
            state: WorkState::Todo,
            project_id: "p1".to_string(),
            owner_id: "u1".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&story).unwrap();
        assert!(json.get("projectId").is_some());
        assert!(json.get("ownerId").is_some());
        assert_eq!(json["state"], "todo");
        assert_eq!(json["priority"], "medium");
    }

    #[test]
    fn update_input_rejects_unknown_fields() {
        let result: Result<TaskUpdateInput, _> =
            serde_json::from_str(r#"{"name":"x","bogus":true}"#);
        assert!(result.is_err());
    }
}
