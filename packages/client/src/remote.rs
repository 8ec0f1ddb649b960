use crate::{Envelope, RemoteError};
use managme_core::types::{
    Project, ProjectCreateInput, ProjectUpdateInput, Story, StoryCreateInput, StoryUpdateInput,
    Task, TaskCreateInput, TaskUpdateInput, User, WorkState,
};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

/// Typed REST client for the domain API (the remote persistence adapter).
#[derive(Debug, Clone)]
pub struct RemoteClient {
    base_url: String,
    http: Client,
}

impl RemoteClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        RemoteClient {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Unwraps the response envelope, mapping non-2xx statuses to errors.
    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<Envelope<serde_json::Value>>()
                .await
                .ok()
                .and_then(|envelope| envelope.error)
                .unwrap_or_else(|| {
                    status.canonical_reason().unwrap_or("unknown error").to_string()
                });
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = response.json().await?;
        envelope.data.ok_or(RemoteError::EmptyEnvelope)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        debug!("GET {}", path);
        let response = self.http.get(self.url(path)).send().await?;
        Self::parse(response).await
    }

    /// GET that treats a 404 as `None` rather than an error.
    async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, RemoteError> {
        debug!("GET {}", path);
        let response = self.http.get(self.url(path)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::parse(response).await.map(Some)
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, RemoteError> {
        debug!("POST {}", path);
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::parse(response).await
    }

    async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, RemoteError> {
        debug!("PUT {}", path);
        let response = self.http.put(self.url(path)).json(body).send().await?;
        Self::parse(response).await
    }

    async fn delete(&self, path: &str) -> Result<bool, RemoteError> {
        debug!("DELETE {}", path);
        let response = self.http.delete(self.url(path)).send().await?;
        Self::parse(response).await
    }

    // Projects

    pub async fn list_projects(&self) -> Result<Vec<Project>, RemoteError> {
        self.get("/api/projects").await
    }

    pub async fn get_project(&self, id: &str) -> Result<Option<Project>, RemoteError> {
        self.get_optional(&format!("/api/projects/{id}")).await
    }

    pub async fn create_project(
        &self,
        input: &ProjectCreateInput,
    ) -> Result<Project, RemoteError> {
        self.post("/api/projects", input).await
    }

    pub async fn update_project(
        &self,
        id: &str,
        input: &ProjectUpdateInput,
    ) -> Result<Project, RemoteError> {
        self.put(&format!("/api/projects/{id}"), input).await
    }

    pub async fn delete_project(&self, id: &str) -> Result<bool, RemoteError> {
        self.delete(&format!("/api/projects/{id}")).await
    }

    pub async fn search_projects(&self, term: &str) -> Result<Vec<Project>, RemoteError> {
        self.get(&format!("/api/projects/search/{term}")).await
    }

    pub async fn project_stories(&self, id: &str) -> Result<Vec<Story>, RemoteError> {
        self.get(&format!("/api/projects/{id}/stories")).await
    }

    // Stories

    pub async fn list_stories(&self) -> Result<Vec<Story>, RemoteError> {
        self.get("/api/stories").await
    }

    pub async fn get_story(&self, id: &str) -> Result<Option<Story>, RemoteError> {
        self.get_optional(&format!("/api/stories/{id}")).await
    }

    pub async fn create_story(&self, input: &StoryCreateInput) -> Result<Story, RemoteError> {
        self.post("/api/stories", input).await
    }

    pub async fn update_story(
        &self,
        id: &str,
        input: &StoryUpdateInput,
    ) -> Result<Story, RemoteError> {
        self.put(&format!("/api/stories/{id}"), input).await
    }

    pub async fn delete_story(&self, id: &str) -> Result<bool, RemoteError> {
        self.delete(&format!("/api/stories/{id}")).await
    }

    pub async fn story_tasks(&self, id: &str) -> Result<Vec<Task>, RemoteError> {
        self.get(&format!("/api/stories/{id}/tasks")).await
    }

    // Tasks

    pub async fn list_tasks(&self) -> Result<Vec<Task>, RemoteError> {
        self.get("/api/tasks").await
    }

    pub async fn get_task(&self, id: &str) -> Result<Option<Task>, RemoteError> {
        self.get_optional(&format!("/api/tasks/{id}")).await
    }

    pub async fn create_task(&self, input: &TaskCreateInput) -> Result<Task, RemoteError> {
        self.post("/api/tasks", input).await
    }

    pub async fn update_task(
        &self,
        id: &str,
        input: &TaskUpdateInput,
    ) -> Result<Task, RemoteError> {
        self.put(&format!("/api/tasks/{id}"), input).await
    }

    pub async fn delete_task(&self, id: &str) -> Result<bool, RemoteError> {
        self.delete(&format!("/api/tasks/{id}")).await
    }

    pub async fn tasks_by_state(&self, state: WorkState) -> Result<Vec<Task>, RemoteError> {
        self.get(&format!("/api/tasks/state/{state}")).await
    }

    pub async fn assign_task(&self, id: &str, user_id: &str) -> Result<Task, RemoteError> {
        self.post(
            &format!("/api/tasks/{id}/assign"),
            &json!({ "userId": user_id }),
        )
        .await
    }

    pub async fn complete_task(&self, id: &str) -> Result<Task, RemoteError> {
        self.post(&format!("/api/tasks/{id}/complete"), &json!({})).await
    }

    // Users

    pub async fn list_users(&self) -> Result<Vec<User>, RemoteError> {
        self.get("/api/users").await
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>, RemoteError> {
        self.get_optional(&format!("/api/users/{id}")).await
    }

    pub async fn assignable_users(&self) -> Result<Vec<User>, RemoteError> {
        self.get("/api/users/assignable").await
    }
}
