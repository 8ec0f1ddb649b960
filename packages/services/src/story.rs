use crate::backend::BackendState;
use crate::{map_remote, ServiceResult};
use async_trait::async_trait;
use chrono::Utc;
use managme_client::{RemoteClient, RemoteError};
use managme_core::generate_local_id;
use managme_core::types::{Story, StoryCreateInput, StoryUpdateInput};
use managme_storage::LocalStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Capability to look up the stories of a project. Injected into
/// `TaskService` so the task/story dependency points one way.
#[async_trait]
pub trait StoryLookup: Send + Sync {
    async fn stories_by_project(&self, project_id: &str) -> ServiceResult<Vec<Story>>;
}

/// Story service: remote-first CRUD with sticky local fallback.
pub struct StoryService {
    remote: Arc<RemoteClient>,
    local: LocalStore,
    backend: Arc<BackendState>,
    cache: RwLock<Vec<Story>>,
}

impl StoryService {
    pub fn new(remote: Arc<RemoteClient>, local: LocalStore) -> Self {
        Self::with_backend(remote, local, Arc::new(BackendState::new()))
    }

    pub fn with_backend(
        remote: Arc<RemoteClient>,
        local: LocalStore,
        backend: Arc<BackendState>,
    ) -> Self {
        StoryService {
            remote,
            local,
            backend,
            cache: RwLock::new(Vec::new()),
        }
    }

    pub fn backend(&self) -> &BackendState {
        &self.backend
    }

    pub async fn cached(&self) -> Vec<Story> {
        self.cache.read().await.clone()
    }

    async fn cache_upsert(&self, story: Story) {
        let mut cache = self.cache.write().await;
        match cache.iter().position(|s| s.id == story.id) {
            Some(index) => cache[index] = story,
            None => cache.push(story),
        }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Story>> {
        if self.backend.is_remote() {
            match self.remote.list_stories().await {
                Ok(stories) => {
                    *self.cache.write().await = stories.clone();
                    return Ok(stories);
                }
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }

        let stories = self.local.list_stories().await?;
        *self.cache.write().await = stories.clone();
        Ok(stories)
    }

    pub async fn get_by_id(&self, id: &str) -> ServiceResult<Option<Story>> {
        if self.backend.is_remote() {
            match self.remote.get_story(id).await {
                Ok(story) => return Ok(story),
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }
        Ok(self.local.get_story(id).await?)
    }

    pub async fn save(&self, mut story: Story) -> ServiceResult<Story> {
        if self.backend.is_remote() {
            match self.save_remote(&story).await {
                Ok(saved) => {
                    self.cache_upsert(saved.clone()).await;
                    return Ok(saved);
                }
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }

        if story.id.is_empty() {
            story.id = generate_local_id();
            story.created_at = Utc::now();
        }
        self.local.upsert_story(story.clone()).await?;
        self.cache_upsert(story.clone()).await;
        debug!(id = %story.id, "Saved story locally");
        Ok(story)
    }

    async fn save_remote(&self, story: &Story) -> Result<Story, RemoteError> {
        let create_input = StoryCreateInput {
            name: story.name.clone(),
            description: story.description.clone(),
            priority: story.priority,
            project_id: story.project_id.clone(),
            owner_id: story.owner_id.clone(),
        };

        if story.id.is_empty() {
            return self.remote.create_story(&create_input).await;
        }

        let updates = StoryUpdateInput {
            name: Some(story.name.clone()),
            description: Some(story.description.clone()),
            priority: Some(story.priority),
            state: Some(story.state),
        };
        match self.remote.update_story(&story.id, &updates).await {
            Ok(saved) => Ok(saved),
            Err(RemoteError::Status { status: 404, .. }) => {
                self.remote.create_story(&create_input).await
            }
            Err(e) => Err(e),
        }
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<bool> {
        if self.backend.is_remote() {
            match self.remote.delete_story(id).await {
                Ok(deleted) => {
                    self.cache.write().await.retain(|s| s.id != id);
                    return Ok(deleted);
                }
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }

        let deleted = self.local.delete_story(id).await?;
        self.cache.write().await.retain(|s| s.id != id);
        Ok(deleted)
    }

    pub async fn by_project(&self, project_id: &str) -> ServiceResult<Vec<Story>> {
        if self.backend.is_remote() {
            match self.remote.project_stories(project_id).await {
                Ok(stories) => return Ok(stories),
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }

        let stories = self.local.list_stories().await?;
        Ok(stories
            .into_iter()
            .filter(|s| s.project_id == project_id)
            .collect())
    }
}

#[async_trait]
impl StoryLookup for StoryService {
    async fn stories_by_project(&self, project_id: &str) -> ServiceResult<Vec<Story>> {
        self.by_project(project_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use managme_core::types::{Priority, WorkState};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn local_service(dir: &TempDir) -> StoryService {
        let backend = Arc::new(BackendState::new());
        backend.demote(&"test setup");
        StoryService::with_backend(
            Arc::new(RemoteClient::new("http://127.0.0.1:1")),
            LocalStore::new(dir.path()),
            backend,
        )
    }

    fn draft(name: &str, project_id: &str) -> Story {
        Story {
            id: String::new(),
            name: name.to_string(),
            description: "desc".to_string(),
            priority: Priority::Medium,
            state: WorkState::Todo,
            project_id: project_id.to_string(),
            owner_id: "user-2".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn stories_filter_by_owning_project() {
        let dir = TempDir::new().unwrap();
        let service = local_service(&dir);

        service.save(draft("A", "p1")).await.unwrap();
        service.save(draft("B", "p1")).await.unwrap();
        service.save(draft("C", "p2")).await.unwrap();

        assert_eq!(service.by_project("p1").await.unwrap().len(), 2);
        assert_eq!(service.by_project("p2").await.unwrap().len(), 1);
        assert!(service.by_project("p3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_preserves_state_and_priority() {
        let dir = TempDir::new().unwrap();
        let service = local_service(&dir);

        let mut story = service.save(draft("A", "p1")).await.unwrap();
        story.state = WorkState::Doing;
        story.priority = Priority::High;
        service.save(story.clone()).await.unwrap();

        let fetched = service.get_by_id(&story.id).await.unwrap().unwrap();
        assert_eq!(fetched.state, WorkState::Doing);
        assert_eq!(fetched.priority, Priority::High);
    }

    #[tokio::test]
    async fn lookup_trait_delegates_to_by_project() {
        let dir = TempDir::new().unwrap();
        let service = local_service(&dir);
        service.save(draft("A", "p1")).await.unwrap();

        let lookup: &dyn StoryLookup = &service;
        assert_eq!(lookup.stories_by_project("p1").await.unwrap().len(), 1);
    }
}
