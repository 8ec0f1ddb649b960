use crate::backend::BackendState;
use crate::story::StoryLookup;
use crate::{map_remote, ServiceError, ServiceResult};
use chrono::Utc;
use managme_client::{RemoteClient, RemoteError};
use managme_core::generate_local_id;
use managme_core::types::{Task, TaskCreateInput, TaskUpdateInput, User, WorkState};
use managme_storage::LocalStore;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Task service: CRUD plus the task lifecycle.
///
/// The lifecycle is linear and never regresses: todo → doing → done.
/// Assignment moves todo → doing and must name an assignable user;
/// completion moves doing → done. Invalid transitions are rejected with
/// an explicit error and never mutate the task.
pub struct TaskService {
    remote: Arc<RemoteClient>,
    local: LocalStore,
    backend: Arc<BackendState>,
    cache: RwLock<Vec<Task>>,
    stories: Arc<dyn StoryLookup>,
}

impl TaskService {
    pub fn new(
        remote: Arc<RemoteClient>,
        local: LocalStore,
        stories: Arc<dyn StoryLookup>,
    ) -> Self {
        Self::with_backend(remote, local, stories, Arc::new(BackendState::new()))
    }

    pub fn with_backend(
        remote: Arc<RemoteClient>,
        local: LocalStore,
        stories: Arc<dyn StoryLookup>,
        backend: Arc<BackendState>,
    ) -> Self {
        TaskService {
            remote,
            local,
            backend,
            cache: RwLock::new(Vec::new()),
            stories,
        }
    }

    pub fn backend(&self) -> &BackendState {
        &self.backend
    }

    pub async fn cached(&self) -> Vec<Task> {
        self.cache.read().await.clone()
    }

    async fn cache_upsert(&self, task: Task) {
        let mut cache = self.cache.write().await;
        match cache.iter().position(|t| t.id == task.id) {
            Some(index) => cache[index] = task,
            None => cache.push(task),
        }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Task>> {
        if self.backend.is_remote() {
            match self.remote.list_tasks().await {
                Ok(tasks) => {
                    *self.cache.write().await = tasks.clone();
                    return Ok(tasks);
                }
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }

        let tasks = self.local.list_tasks().await?;
        *self.cache.write().await = tasks.clone();
        Ok(tasks)
    }

    pub async fn get_by_id(&self, id: &str) -> ServiceResult<Option<Task>> {
        if self.backend.is_remote() {
            match self.remote.get_task(id).await {
                Ok(task) => return Ok(task),
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }
        Ok(self.local.get_task(id).await?)
    }

    pub async fn save(&self, mut task: Task) -> ServiceResult<Task> {
        if self.backend.is_remote() {
            match self.save_remote(&task).await {
                Ok(saved) => {
                    self.cache_upsert(saved.clone()).await;
                    return Ok(saved);
                }
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }

        if task.id.is_empty() {
            task.id = generate_local_id();
            task.created_at = Utc::now();
        }
        self.local.upsert_task(task.clone()).await?;
        self.cache_upsert(task.clone()).await;
        debug!(id = %task.id, "Saved task locally");
        Ok(task)
    }

    async fn save_remote(&self, task: &Task) -> Result<Task, RemoteError> {
        let create_input = TaskCreateInput {
            name: task.name.clone(),
            description: task.description.clone(),
            priority: task.priority,
            story_id: task.story_id.clone(),
            estimated_time: task.estimated_time,
        };

        if task.id.is_empty() {
            return self.remote.create_task(&create_input).await;
        }

        let updates = TaskUpdateInput {
            name: Some(task.name.clone()),
            description: Some(task.description.clone()),
            priority: Some(task.priority),
            estimated_time: Some(task.estimated_time),
        };
        match self.remote.update_task(&task.id, &updates).await {
            Ok(saved) => Ok(saved),
            Err(RemoteError::Status { status: 404, .. }) => {
                self.remote.create_task(&create_input).await
            }
            Err(e) => Err(e),
        }
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<bool> {
        if self.backend.is_remote() {
            match self.remote.delete_task(id).await {
                Ok(deleted) => {
                    self.cache.write().await.retain(|t| t.id != id);
                    return Ok(deleted);
                }
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }

        let deleted = self.local.delete_task(id).await?;
        self.cache.write().await.retain(|t| t.id != id);
        Ok(deleted)
    }

    pub async fn by_story(&self, story_id: &str) -> ServiceResult<Vec<Task>> {
        if self.backend.is_remote() {
            match self.remote.story_tasks(story_id).await {
                Ok(tasks) => return Ok(tasks),
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }

        let tasks = self.local.list_tasks().await?;
        Ok(tasks.into_iter().filter(|t| t.story_id == story_id).collect())
    }

    pub async fn by_state(&self, state: WorkState) -> ServiceResult<Vec<Task>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|t| t.state == state)
            .collect())
    }

    pub async fn by_assignee(&self, user_id: &str) -> ServiceResult<Vec<Task>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|t| t.assigned_user_id.as_deref() == Some(user_id))
            .collect())
    }

    /// Tasks of every story belonging to the project, joined through the
    /// injected story lookup.
    pub async fn by_project(&self, project_id: &str) -> ServiceResult<Vec<Task>> {
        let stories = self.stories.stories_by_project(project_id).await?;
        let story_ids: HashSet<String> = stories.into_iter().map(|s| s.id).collect();

        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|t| story_ids.contains(&t.story_id))
            .collect())
    }

    async fn lookup_user(&self, user_id: &str) -> ServiceResult<Option<User>> {
        if self.backend.is_remote() {
            match self.remote.get_user(user_id).await {
                Ok(user) => return Ok(user),
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }
        Ok(self.local.get_user(user_id).await?)
    }

    /// Assigns an assignable user to a todo task, moving it to doing and
    /// stamping the start date.
    pub async fn assign(&self, task_id: &str, user_id: &str) -> ServiceResult<Task> {
        let task = self
            .get_by_id(task_id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        if task.state != WorkState::Todo {
            return Err(ServiceError::InvalidTransition {
                from: task.state,
                expected: WorkState::Todo,
            });
        }

        let user = self
            .lookup_user(user_id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        if !user.role.is_assignable() {
            return Err(ServiceError::NotAssignable(user_id.to_string()));
        }

        if self.backend.is_remote() {
            match self.remote.assign_task(task_id, user_id).await {
                Ok(task) => {
                    self.cache_upsert(task.clone()).await;
                    return Ok(task);
                }
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }

        let mut task = task;
        task.assigned_user_id = Some(user_id.to_string());
        task.state = WorkState::Doing;
        task.start_date = Some(Utc::now());
        self.local.upsert_task(task.clone()).await?;
        self.cache_upsert(task.clone()).await;
        info!(task_id = %task.id, user_id = %user_id, "Task assigned");
        Ok(task)
    }

    /// Completes a doing task, stamping the end date.
    pub async fn complete(&self, task_id: &str) -> ServiceResult<Task> {
        let task = self
            .get_by_id(task_id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        if task.state != WorkState::Doing {
            return Err(ServiceError::InvalidTransition {
                from: task.state,
                expected: WorkState::Doing,
            });
        }

        if self.backend.is_remote() {
            match self.remote.complete_task(task_id).await {
                Ok(task) => {
                    self.cache_upsert(task.clone()).await;
                    return Ok(task);
                }
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }

        let mut task = task;
        task.state = WorkState::Done;
        task.end_date = Some(Utc::now());
        self.local.upsert_task(task.clone()).await?;
        self.cache_upsert(task.clone()).await;
        info!(task_id = %task.id, "Task completed");
        Ok(task)
    }
}
