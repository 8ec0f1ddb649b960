use crate::json::{read_or_default, write_pretty};
use crate::{StoreError, StoreResult};
use chrono::Utc;
use managme_core::generate_server_id;
use managme_core::types::{
    Project, ProjectCreateInput, ProjectUpdateInput, Story, StoryCreateInput, StoryUpdateInput,
    Task, TaskCreateInput, TaskUpdateInput, User, WorkState,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// On-disk document holding every server-side collection
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreDocument {
    version: String,
    projects: Vec<Project>,
    stories: Vec<Story>,
    tasks: Vec<Task>,
    users: Vec<User>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        StoreDocument {
            version: managme_core::STORE_VERSION.to_string(),
            projects: Vec::new(),
            stories: Vec::new(),
            tasks: Vec::new(),
            users: Vec::new(),
        }
    }
}

/// The domain API's durable store: a single JSON document behind an async
/// lock. Ids minted here are 24-char hex, the opaque remote shape clients
/// must not assume anything about.
pub struct DataStore {
    path: PathBuf,
    doc: RwLock<StoreDocument>,
}

impl DataStore {
    /// Opens (or initializes) the store at the given path.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let doc: StoreDocument = read_or_default(&path).await?;
        debug!(
            "Opened data store at {:?}: {} projects, {} stories, {} tasks, {} users",
            path,
            doc.projects.len(),
            doc.stories.len(),
            doc.tasks.len(),
            doc.users.len()
        );
        Ok(DataStore {
            path,
            doc: RwLock::new(doc),
        })
    }

    async fn persist(&self, doc: &StoreDocument) -> StoreResult<()> {
        write_pretty(&self.path, doc).await
    }

    // Projects

    pub async fn list_projects(&self) -> Vec<Project> {
        self.doc.read().await.projects.clone()
    }

    pub async fn get_project(&self, id: &str) -> Option<Project> {
        let doc = self.doc.read().await;
        doc.projects.iter().find(|p| p.id == id).cloned()
    }

    pub async fn create_project(&self, input: ProjectCreateInput) -> StoreResult<Project> {
        let now = Utc::now();
        let project = Project {
            id: generate_server_id(),
            name: input.name,
            description: input.description,
            created_at: now,
            updated_at: now,
        };

        let mut doc = self.doc.write().await;
        doc.projects.push(project.clone());
        self.persist(&doc).await?;
        Ok(project)
    }

    pub async fn update_project(
        &self,
        id: &str,
        input: ProjectUpdateInput,
    ) -> StoreResult<Project> {
        let mut doc = self.doc.write().await;
        let project = doc
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(name) = input.name {
            project.name = name;
        }
        if let Some(description) = input.description {
            project.description = description;
        }
        project.updated_at = Utc::now();

        let updated = project.clone();
        self.persist(&doc).await?;
        Ok(updated)
    }

    /// Deletes a project. Stories are deliberately not cascaded.
    pub async fn delete_project(&self, id: &str) -> StoreResult<bool> {
        let mut doc = self.doc.write().await;
        let before = doc.projects.len();
        doc.projects.retain(|p| p.id != id);
        if doc.projects.len() == before {
            return Ok(false);
        }
        self.persist(&doc).await?;
        Ok(true)
    }

    /// Case-insensitive substring search over project name and description.
    pub async fn search_projects(&self, term: &str) -> Vec<Project> {
        let needle = term.to_lowercase();
        let doc = self.doc.read().await;
        doc.projects
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    // Stories

    pub async fn list_stories(&self) -> Vec<Story> {
        self.doc.read().await.stories.clone()
    }

    pub async fn get_story(&self, id: &str) -> Option<Story> {
        let doc = self.doc.read().await;
        doc.stories.iter().find(|s| s.id == id).cloned()
    }

    pub async fn create_story(&self, input: StoryCreateInput) -> StoreResult<Story> {
        let story = Story {
            id: generate_server_id(),
            name: input.name,
            description: input.description,
            priority: input.priority,
            state: WorkState::Todo,
            project_id: input.project_id,
            owner_id: input.owner_id,
            created_at: Utc::now(),
        };

        let mut doc = self.doc.write().await;
        doc.stories.push(story.clone());
        self.persist(&doc).await?;
        Ok(story)
    }

    pub async fn update_story(&self, id: &str, input: StoryUpdateInput) -> StoreResult<Story> {
        let mut doc = self.doc.write().await;
        let story = doc
            .stories
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(name) = input.name {
            story.name = name;
        }
        if let Some(description) = input.description {
            story.description = description;
        }
        if let Some(priority) = input.priority {
            story.priority = priority;
        }
        if let Some(state) = input.state {
            story.state = state;
        }

        let updated = story.clone();
        self.persist(&doc).await?;
        Ok(updated)
    }

    pub async fn delete_story(&self, id: &str) -> StoreResult<bool> {
        let mut doc = self.doc.write().await;
        let before = doc.stories.len();
        doc.stories.retain(|s| s.id != id);
        if doc.stories.len() == before {
            return Ok(false);
        }
        self.persist(&doc).await?;
        Ok(true)
    }

    pub async fn stories_by_project(&self, project_id: &str) -> Vec<Story> {
        let doc = self.doc.read().await;
        doc.stories
            .iter()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect()
    }

    // Tasks

    pub async fn list_tasks(&self) -> Vec<Task> {
        self.doc.read().await.tasks.clone()
    }

    pub async fn get_task(&self, id: &str) -> Option<Task> {
        let doc = self.doc.read().await;
        doc.tasks.iter().find(|t| t.id == id).cloned()
    }

    pub async fn create_task(&self, input: TaskCreateInput) -> StoreResult<Task> {
        let task = Task {
            id: generate_server_id(),
            name: input.name,
            description: input.description,
            priority: input.priority,
            state: WorkState::Todo,
            story_id: input.story_id,
            estimated_time: input.estimated_time,
            assigned_user_id: None,
            start_date: None,
            end_date: None,
            created_at: Utc::now(),
        };

        let mut doc = self.doc.write().await;
        doc.tasks.push(task.clone());
        self.persist(&doc).await?;
        Ok(task)
    }

    pub async fn update_task(&self, id: &str, input: TaskUpdateInput) -> StoreResult<Task> {
        let mut doc = self.doc.write().await;
        let task = doc
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(name) = input.name {
            task.name = name;
        }
        if let Some(description) = input.description {
            task.description = description;
        }
        if let Some(priority) = input.priority {
            task.priority = priority;
        }
        if let Some(estimated_time) = input.estimated_time {
            task.estimated_time = estimated_time;
        }

        let updated = task.clone();
        self.persist(&doc).await?;
        Ok(updated)
    }

    pub async fn delete_task(&self, id: &str) -> StoreResult<bool> {
        let mut doc = self.doc.write().await;
        let before = doc.tasks.len();
        doc.tasks.retain(|t| t.id != id);
        if doc.tasks.len() == before {
            return Ok(false);
        }
        self.persist(&doc).await?;
        Ok(true)
    }

    pub async fn tasks_by_story(&self, story_id: &str) -> Vec<Task> {
        let doc = self.doc.read().await;
        doc.tasks
            .iter()
            .filter(|t| t.story_id == story_id)
            .cloned()
            .collect()
    }

    pub async fn tasks_by_state(&self, state: WorkState) -> Vec<Task> {
        let doc = self.doc.read().await;
        doc.tasks.iter().filter(|t| t.state == state).cloned().collect()
    }

    pub async fn tasks_by_assignee(&self, user_id: &str) -> Vec<Task> {
        let doc = self.doc.read().await;
        doc.tasks
            .iter()
            .filter(|t| t.assigned_user_id.as_deref() == Some(user_id))
            .cloned()
            .collect()
    }

    /// Tasks belonging to any story of the given project.
    pub async fn tasks_by_project(&self, project_id: &str) -> Vec<Task> {
        let doc = self.doc.read().await;
        let story_ids: Vec<&str> = doc
            .stories
            .iter()
            .filter(|s| s.project_id == project_id)
            .map(|s| s.id.as_str())
            .collect();

        doc.tasks
            .iter()
            .filter(|t| story_ids.contains(&t.story_id.as_str()))
            .cloned()
            .collect()
    }

    /// Assigns a user to a task. Valid only from `todo`; the target user
    /// must exist and hold an assignable role.
    pub async fn assign_task(&self, task_id: &str, user_id: &str) -> StoreResult<Task> {
        let mut doc = self.doc.write().await;

        let user = doc
            .users
            .iter()
            .find(|u| u.id == user_id)
            .ok_or(StoreError::NotFound)?;
        if !user.role.is_assignable() {
            return Err(StoreError::NotAssignable(user_id.to_string()));
        }

        let task = doc
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or(StoreError::NotFound)?;
        if task.state != WorkState::Todo {
            return Err(StoreError::InvalidTransition(task.state, WorkState::Todo));
        }

        task.assigned_user_id = Some(user_id.to_string());
        task.state = WorkState::Doing;
        task.start_date = Some(Utc::now());

        let updated = task.clone();
        self.persist(&doc).await?;
        Ok(updated)
    }

    /// Completes a task. Valid only from `doing`.
    pub async fn complete_task(&self, task_id: &str) -> StoreResult<Task> {
        let mut doc = self.doc.write().await;
        let task = doc
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or(StoreError::NotFound)?;
        if task.state != WorkState::Doing {
            return Err(StoreError::InvalidTransition(task.state, WorkState::Doing));
        }

        task.state = WorkState::Done;
        task.end_date = Some(Utc::now());

        let updated = task.clone();
        self.persist(&doc).await?;
        Ok(updated)
    }

    // Users

    pub async fn list_users(&self) -> Vec<User> {
        self.doc.read().await.users.clone()
    }

    pub async fn get_user(&self, id: &str) -> Option<User> {
        let doc = self.doc.read().await;
        doc.users.iter().find(|u| u.id == id).cloned()
    }

    pub async fn assignable_users(&self) -> Vec<User> {
        let doc = self.doc.read().await;
        doc.users
            .iter()
            .filter(|u| u.role.is_assignable())
            .cloned()
            .collect()
    }

    /// Installs the given roster when the store has no users yet.
    /// Returns whether anything was installed.
    pub async fn seed_users(&self, users: Vec<User>) -> StoreResult<bool> {
        let mut doc = self.doc.write().await;
        if !doc.users.is_empty() {
            return Ok(false);
        }
        info!("Seeding {} users into empty store", users.len());
        doc.users = users;
        self.persist(&doc).await?;
        Ok(true)
    }
}
