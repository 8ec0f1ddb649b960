use crate::ServiceResult;
use managme_storage::LocalStore;
use tracing::debug;

/// Tracks which project the user is currently working in.
///
/// The selection is a purely client-side concern, so it lives in the
/// session file regardless of which backend serves entity data.
pub struct ActiveProjectService {
    local: LocalStore,
}

impl ActiveProjectService {
    pub fn new(local: LocalStore) -> Self {
        ActiveProjectService { local }
    }

    pub async fn get(&self) -> ServiceResult<Option<String>> {
        Ok(self.local.session().await?.active_project_id)
    }

    pub async fn set(&self, project_id: &str) -> ServiceResult<()> {
        let mut session = self.local.session().await?;
        session.active_project_id = Some(project_id.to_string());
        self.local.write_session(&session).await?;
        debug!(project_id, "Active project selected");
        Ok(())
    }

    pub async fn clear(&self) -> ServiceResult<()> {
        let mut session = self.local.session().await?;
        session.active_project_id = None;
        self.local.write_session(&session).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn selection_round_trips_and_clears() {
        let dir = TempDir::new().unwrap();
        let service = ActiveProjectService::new(LocalStore::new(dir.path()));

        assert_eq!(service.get().await.unwrap(), None);

        service.set("proj-1").await.unwrap();
        assert_eq!(service.get().await.unwrap(), Some("proj-1".to_string()));

        service.set("proj-2").await.unwrap();
        assert_eq!(service.get().await.unwrap(), Some("proj-2".to_string()));

        service.clear().await.unwrap();
        assert_eq!(service.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn selection_does_not_disturb_other_session_fields() {
        let dir = TempDir::new().unwrap();
        let local = LocalStore::new(dir.path());
        let service = ActiveProjectService::new(local.clone());

        let mut session = local.session().await.unwrap();
        session.token = Some("access".to_string());
        local.write_session(&session).await.unwrap();

        service.set("proj-1").await.unwrap();
        let session = local.session().await.unwrap();
        assert_eq!(session.token.as_deref(), Some("access"));
        assert_eq!(session.active_project_id.as_deref(), Some("proj-1"));
    }
}
