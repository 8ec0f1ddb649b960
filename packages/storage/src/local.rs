use crate::json::{read_or_default, write_pretty};
use crate::{HasId, StoreResult};
use managme_core::constants::managme_dir;
use managme_core::types::{Project, Story, Task, User};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const PROJECTS_FILE: &str = "projects.json";
const STORIES_FILE: &str = "stories.json";
const TASKS_FILE: &str = "tasks.json";
const USERS_FILE: &str = "users.json";
const SESSION_FILE: &str = "session.json";

/// Session state persisted alongside the entity collections: the logged-in
/// user, the project selected in the UI, and the current token pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "currentUser")]
    pub current_user: Option<User>,
    #[serde(rename = "activeProjectId")]
    pub active_project_id: Option<String>,
    pub token: Option<String>,
    #[serde(rename = "refreshToken")]
    pub refresh_token: Option<String>,
}

/// Local persistence adapter: one JSON array file per entity collection
/// under a base directory, mirroring the browser local-storage layout.
#[derive(Debug, Clone)]
pub struct LocalStore {
    base: PathBuf,
}

impl LocalStore {
    /// Creates a store rooted at the given directory.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        LocalStore { base: base.into() }
    }

    /// Creates a store at the default location (~/.managme).
    pub fn default_location() -> Self {
        LocalStore::new(managme_dir())
    }

    fn path(&self, file: &str) -> PathBuf {
        self.base.join(file)
    }

    async fn list_in<T>(&self, file: &str) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        read_or_default(&self.path(file)).await
    }

    async fn get_in<T>(&self, file: &str, id: &str) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned + HasId,
    {
        let items: Vec<T> = self.list_in(file).await?;
        Ok(items.into_iter().find(|item| item.id() == id))
    }

    /// Inserts the item, or replaces the existing item with the same id.
    async fn upsert_in<T>(&self, file: &str, item: T) -> StoreResult<()>
    where
        T: Serialize + DeserializeOwned + HasId,
    {
        let mut items: Vec<T> = self.list_in(file).await?;
        match items.iter().position(|existing| existing.id() == item.id()) {
            Some(index) => items[index] = item,
            None => items.push(item),
        }
        write_pretty(&self.path(file), &items).await
    }

    /// Removes the item with the given id; returns whether anything was removed.
    async fn delete_in<T>(&self, file: &str, id: &str) -> StoreResult<bool>
    where
        T: Serialize + DeserializeOwned + HasId,
    {
        let mut items: Vec<T> = self.list_in(file).await?;
        let before = items.len();
        items.retain(|item| item.id() != id);
        if items.len() == before {
            return Ok(false);
        }
        write_pretty(&self.path(file), &items).await?;
        Ok(true)
    }

    // Projects

    pub async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        self.list_in(PROJECTS_FILE).await
    }

    pub async fn get_project(&self, id: &str) -> StoreResult<Option<Project>> {
        self.get_in(PROJECTS_FILE, id).await
    }

    pub async fn upsert_project(&self, project: Project) -> StoreResult<()> {
        self.upsert_in(PROJECTS_FILE, project).await
    }

    pub async fn delete_project(&self, id: &str) -> StoreResult<bool> {
        self.delete_in::<Project>(PROJECTS_FILE, id).await
    }

    // Stories

    pub async fn list_stories(&self) -> StoreResult<Vec<Story>> {
        self.list_in(STORIES_FILE).await
    }

    pub async fn get_story(&self, id: &str) -> StoreResult<Option<Story>> {
        self.get_in(STORIES_FILE, id).await
    }

    pub async fn upsert_story(&self, story: Story) -> StoreResult<()> {
        self.upsert_in(STORIES_FILE, story).await
    }

    pub async fn delete_story(&self, id: &str) -> StoreResult<bool> {
        self.delete_in::<Story>(STORIES_FILE, id).await
    }

    // Tasks

    pub async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        self.list_in(TASKS_FILE).await
    }

    pub async fn get_task(&self, id: &str) -> StoreResult<Option<Task>> {
        self.get_in(TASKS_FILE, id).await
    }

    pub async fn upsert_task(&self, task: Task) -> StoreResult<()> {
        self.upsert_in(TASKS_FILE, task).await
    }

    pub async fn delete_task(&self, id: &str) -> StoreResult<bool> {
        self.delete_in::<Task>(TASKS_FILE, id).await
    }

    // Users

    pub async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.list_in(USERS_FILE).await
    }

    pub async fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        self.get_in(USERS_FILE, id).await
    }

    pub async fn upsert_user(&self, user: User) -> StoreResult<()> {
        self.upsert_in(USERS_FILE, user).await
    }

    pub async fn delete_user(&self, id: &str) -> StoreResult<bool> {
        self.delete_in::<User>(USERS_FILE, id).await
    }

    /// Replaces the whole cached roster, used when mirroring remote users.
    pub async fn replace_users(&self, users: Vec<User>) -> StoreResult<()> {
        write_pretty(&self.path(USERS_FILE), &users).await
    }

    // Session

    pub async fn session(&self) -> StoreResult<Session> {
        read_or_default(&self.path(SESSION_FILE)).await
    }

    pub async fn write_session(&self, session: &Session) -> StoreResult<()> {
        debug!("Persisting session state");
        write_pretty(&self.path(SESSION_FILE), session).await
    }
}
