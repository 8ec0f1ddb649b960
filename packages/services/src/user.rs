use crate::backend::BackendState;
use crate::{map_remote, ServiceResult};
use managme_client::RemoteClient;
use managme_core::types::{User, UserRole};
use managme_storage::LocalStore;
use std::sync::Arc;
use tracing::debug;

/// Read-only view of the user roster.
///
/// The roster is owned by the server; successful remote listings are
/// mirrored into the local store so the fallback backend can answer
/// assignability checks with the same data.
pub struct UserService {
    remote: Arc<RemoteClient>,
    local: LocalStore,
    backend: Arc<BackendState>,
}

impl UserService {
    pub fn new(remote: Arc<RemoteClient>, local: LocalStore) -> Self {
        Self::with_backend(remote, local, Arc::new(BackendState::new()))
    }

    pub fn with_backend(
        remote: Arc<RemoteClient>,
        local: LocalStore,
        backend: Arc<BackendState>,
    ) -> Self {
        UserService {
            remote,
            local,
            backend,
        }
    }

    pub fn backend(&self) -> &BackendState {
        &self.backend
    }

    pub async fn list(&self) -> ServiceResult<Vec<User>> {
        if self.backend.is_remote() {
            match self.remote.list_users().await {
                Ok(users) => {
                    self.local.replace_users(users.clone()).await?;
                    debug!(count = users.len(), "Mirrored roster to local store");
                    return Ok(users);
                }
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }
        Ok(self.local.list_users().await?)
    }

    pub async fn get_by_id(&self, id: &str) -> ServiceResult<Option<User>> {
        if self.backend.is_remote() {
            match self.remote.get_user(id).await {
                Ok(user) => return Ok(user),
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }
        Ok(self.local.get_user(id).await?)
    }

    /// Users eligible for task assignment (developer and devops roles).
    pub async fn assignable(&self) -> ServiceResult<Vec<User>> {
        if self.backend.is_remote() {
            match self.remote.assignable_users().await {
                Ok(users) => return Ok(users),
                Err(e) if e.is_unavailable() => self.backend.demote(&e),
                Err(e) => return Err(map_remote(e)),
            }
        }
        let users = self.local.list_users().await?;
        Ok(users.into_iter().filter(|u| u.role.is_assignable()).collect())
    }

    pub async fn by_role(&self, role: UserRole) -> ServiceResult<Vec<User>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|u| u.role == role)
            .collect())
    }

    /// The user recorded by the last login, if any.
    pub async fn current_user(&self) -> ServiceResult<Option<User>> {
        Ok(self.local.session().await?.current_user)
    }

    pub async fn set_current_user(&self, user: Option<User>) -> ServiceResult<()> {
        let mut session = self.local.session().await?;
        session.current_user = user;
        self.local.write_session(&session).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn user(id: &str, role: UserRole) -> User {
        User {
            id: id.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role,
        }
    }

    async fn local_service(dir: &TempDir) -> UserService {
        let backend = Arc::new(BackendState::new());
        backend.demote(&"test setup");
        UserService::with_backend(
            Arc::new(RemoteClient::new("http://127.0.0.1:1")),
            LocalStore::new(dir.path()),
            backend,
        )
    }

    #[tokio::test]
    async fn assignable_excludes_admins() {
        let dir = TempDir::new().unwrap();
        let service = local_service(&dir).await;
        service
            .local
            .replace_users(vec![
                user("u1", UserRole::Admin),
                user("u2", UserRole::Developer),
                user("u3", UserRole::Devops),
            ])
            .await
            .unwrap();

        let assignable = service.assignable().await.unwrap();
        let ids: Vec<&str> = assignable.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["u2", "u3"]);
    }

    #[tokio::test]
    async fn by_role_filters_the_roster() {
        let dir = TempDir::new().unwrap();
        let service = local_service(&dir).await;
        service
            .local
            .replace_users(vec![
                user("u1", UserRole::Admin),
                user("u2", UserRole::Developer),
            ])
            .await
            .unwrap();

        let admins = service.by_role(UserRole::Admin).await.unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].id, "u1");
    }

    #[tokio::test]
    async fn current_user_round_trips_through_the_session() {
        let dir = TempDir::new().unwrap();
        let service = local_service(&dir).await;

        assert!(service.current_user().await.unwrap().is_none());

        let anna = user("u2", UserRole::Developer);
        service.set_current_user(Some(anna.clone())).await.unwrap();
        assert_eq!(service.current_user().await.unwrap(), Some(anna));

        service.set_current_user(None).await.unwrap();
        assert!(service.current_user().await.unwrap().is_none());
    }
}
