use crate::backend::BackendState;
use crate::{map_remote, ServiceResult};
use chrono::Utc;
use managme_client::{RemoteClient, RemoteError};
use managme_core::generate_local_id;
use managme_core::types::{Project, ProjectCreateInput, ProjectUpdateInput};
use managme_storage::LocalStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Project service: remote-first CRUD with sticky local fallback and an
/// in-memory cache of the last-fetched collection.
pub struct ProjectService {
    remote: Arc<RemoteClient>,
    local: LocalStore,
    backend: Arc<BackendState>,
    cache: RwLock<Vec<Project>>,
}

impl ProjectService {
    pub fn new(remote: Arc<RemoteClient>, local: LocalStore) -> Self {
        Self::with_backend(remote, local, Arc::new(BackendState::new()))
    }

    pub fn with_backend(
        remote: Arc<RemoteClient>,
        local: LocalStore,
        backend: Arc<BackendState>,
    ) -> Self {
        ProjectService {
            remote,
            local,
            backend,
            cache: RwLock::new(Vec::new()),
        }
    }

    pub fn backend(&self) -> &BackendState {
        &self.backend
    }

    /// The last collection this service fetched, whatever the backend.
    pub async fn cached(&self) -> Vec<Project> {
        self.cache.read().await.clone()
    }

    async fn cache_upsert(&self, project: Project) {
        let mut cache = self.cache.write().await;
        match cache.iter().position(|p| p.id == project.id) {
            Some(index) => cache[index] = project,
            None => cache.push(project),
        }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Project>> {
        if self.backend.is_remote() {
            match self.remote.list_projects().await {
                Ok(projects) => {
                    *self.cache.write().await = projects.clone();
                    return Ok(projects);
                }
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }

        let projects = self.local.list_projects().await?;
        *self.cache.write().await = projects.clone();
        Ok(projects)
    }

    pub async fn get_by_id(&self, id: &str) -> ServiceResult<Option<Project>> {
        if self.backend.is_remote() {
            match self.remote.get_project(id).await {
                Ok(project) => return Ok(project),
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }
        Ok(self.local.get_project(id).await?)
    }

    /// Saves a project: creates when the id is empty or unknown, updates
    /// otherwise. In REMOTE mode the server-assigned id is adopted.
    pub async fn save(&self, mut project: Project) -> ServiceResult<Project> {
        if self.backend.is_remote() {
            match self.save_remote(&project).await {
                Ok(saved) => {
                    self.cache_upsert(saved.clone()).await;
                    return Ok(saved);
                }
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }

        let now = Utc::now();
        if project.id.is_empty() {
            project.id = generate_local_id();
            project.created_at = now;
        }
        project.updated_at = now;
        self.local.upsert_project(project.clone()).await?;
        self.cache_upsert(project.clone()).await;
        debug!(id = %project.id, "Saved project locally");
        Ok(project)
    }

    async fn save_remote(&self, project: &Project) -> Result<Project, RemoteError> {
        if project.id.is_empty() {
            return self
                .remote
                .create_project(&ProjectCreateInput {
                    name: project.name.clone(),
                    description: project.description.clone(),
                })
                .await;
        }

        let updates = ProjectUpdateInput {
            name: Some(project.name.clone()),
            description: Some(project.description.clone()),
        };
        match self.remote.update_project(&project.id, &updates).await {
            Ok(saved) => Ok(saved),
            // Unknown id: fall back to creating a fresh record
            Err(RemoteError::Status { status: 404, .. }) => {
                self.remote
                    .create_project(&ProjectCreateInput {
                        name: project.name.clone(),
                        description: project.description.clone(),
                    })
                    .await
            }
            Err(e) => Err(e),
        }
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<bool> {
        if self.backend.is_remote() {
            match self.remote.delete_project(id).await {
                Ok(deleted) => {
                    self.cache.write().await.retain(|p| p.id != id);
                    return Ok(deleted);
                }
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }

        let deleted = self.local.delete_project(id).await?;
        self.cache.write().await.retain(|p| p.id != id);
        Ok(deleted)
    }

    /// Search by name or description. The remote API has a dedicated
    /// endpoint; the local fallback filters client-side.
    pub async fn search(&self, term: &str) -> ServiceResult<Vec<Project>> {
        if self.backend.is_remote() {
            match self.remote.search_projects(term).await {
                Ok(projects) => return Ok(projects),
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }

        let needle = term.to_lowercase();
        let projects = self.local.list_projects().await?;
        Ok(projects
            .into_iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    /// Service wired to a dead remote, pre-demoted so every call is local.
    fn local_service(dir: &TempDir) -> ProjectService {
        let backend = Arc::new(BackendState::new());
        backend.demote(&"test setup");
        ProjectService::with_backend(
            Arc::new(RemoteClient::new("http://127.0.0.1:1")),
            LocalStore::new(dir.path()),
            backend,
        )
    }

    fn draft(name: &str, description: &str) -> Project {
        Project {
            id: String::new(),
            name: name.to_string(),
            description: description.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn local_save_mints_a_uuid_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let service = local_service(&dir);

        let saved = service.save(draft("ManagMe", "tracker")).await.unwrap();
        assert_eq!(saved.id.len(), 36);

        let fetched = service.get_by_id(&saved.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "ManagMe");
        assert_eq!(fetched.description, "tracker");
    }

    #[tokio::test]
    async fn save_with_known_id_updates_in_place() {
        let dir = TempDir::new().unwrap();
        let service = local_service(&dir);

        let mut saved = service.save(draft("Old", "d")).await.unwrap();
        saved.name = "New".to_string();
        let updated = service.save(saved.clone()).await.unwrap();

        assert_eq!(updated.id, saved.id);
        assert_eq!(service.list().await.unwrap().len(), 1);
        assert_eq!(
            service.get_by_id(&saved.id).await.unwrap().unwrap().name,
            "New"
        );
    }

    #[tokio::test]
    async fn delete_missing_is_false_not_error() {
        let dir = TempDir::new().unwrap();
        let service = local_service(&dir);
        assert!(!service.delete("ghost").await.unwrap());
    }

    #[tokio::test]
    async fn local_search_matches_name_and_description() {
        let dir = TempDir::new().unwrap();
        let service = local_service(&dir);
        service.save(draft("ManagMe", "tracker")).await.unwrap();
        service.save(draft("Side", "a TRACKING thing")).await.unwrap();

        assert_eq!(service.search("track").await.unwrap().len(), 2);
        assert_eq!(service.search("managme").await.unwrap().len(), 1);
        assert!(service.search("zzz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cache_follows_the_last_fetch() {
        let dir = TempDir::new().unwrap();
        let service = local_service(&dir);
        service.save(draft("One", "d")).await.unwrap();

        assert_eq!(service.cached().await.len(), 1);
        service.list().await.unwrap();
        assert_eq!(service.cached().await.len(), 1);
    }
}
