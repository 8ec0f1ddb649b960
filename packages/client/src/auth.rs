use managme_core::types::User;
use managme_storage::{LocalStore, StoreError};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Errors from the auth client
#[derive(Error, Debug)]
pub enum AuthClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("auth service returned {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("session expired")]
    SessionExpired,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Default)]
struct TokenPair {
    token: Option<String>,
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: String,
    user: User,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Client half of the auth protocol: holds the token pair, attaches the
/// bearer token to protected calls, and on a 401 performs exactly one
/// refresh-and-retry before forcing logout.
pub struct AuthClient {
    base_url: String,
    http: Client,
    tokens: RwLock<TokenPair>,
    session_store: Option<LocalStore>,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        AuthClient {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
            tokens: RwLock::new(TokenPair::default()),
            session_store: None,
        }
    }

    /// Persist the token pair through the given local store's session file.
    pub fn with_session_store(mut self, store: LocalStore) -> Self {
        self.session_store = Some(store);
        self
    }

    /// Loads any previously persisted token pair into memory.
    pub async fn load_session(&self) -> Result<(), AuthClientError> {
        if let Some(store) = &self.session_store {
            let session = store.session().await?;
            let mut tokens = self.tokens.write().await;
            tokens.token = session.token;
            tokens.refresh_token = session.refresh_token;
        }
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn access_token(&self) -> Option<String> {
        self.tokens.read().await.token.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.tokens.read().await.token.is_some()
    }

    async fn set_tokens(
        &self,
        token: Option<String>,
        refresh_token: Option<String>,
    ) -> Result<(), AuthClientError> {
        {
            let mut tokens = self.tokens.write().await;
            tokens.token = token.clone();
            tokens.refresh_token = refresh_token.clone();
        }
        if let Some(store) = &self.session_store {
            let mut session = store.session().await?;
            session.token = token;
            session.refresh_token = refresh_token;
            store.write_session(&session).await?;
        }
        Ok(())
    }

    async fn clear_tokens(&self) -> Result<(), AuthClientError> {
        self.set_tokens(None, None).await
    }

    async fn parse_bare<T: DeserializeOwned>(response: Response) -> Result<T, AuthClientError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| {
                    status.canonical_reason().unwrap_or("unknown error").to_string()
                });
            return Err(AuthClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    /// Logs in and stores the issued token pair.
    pub async fn login(&self, login: &str, password: &str) -> Result<User, AuthClientError> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&json!({ "login": login, "password": password }))
            .send()
            .await?;
        let body: LoginResponse = Self::parse_bare(response).await?;

        self.set_tokens(Some(body.token), Some(body.refresh_token))
            .await?;
        info!(user_id = %body.user.id, "Logged in");
        Ok(body.user)
    }

    /// Trades the refresh token for a new access token. Failure clears the
    /// session: the caller is logged out.
    pub async fn refresh_access_token(&self) -> Result<(), AuthClientError> {
        let refresh_token = match self.tokens.read().await.refresh_token.clone() {
            Some(token) => token,
            None => return Err(AuthClientError::SessionExpired),
        };

        let response = self
            .http
            .post(self.url("/api/auth/refresh"))
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Token refresh rejected, clearing session");
            self.clear_tokens().await?;
            return Err(AuthClientError::SessionExpired);
        }

        let body: RefreshResponse = response.json::<RefreshResponse>().await?;
        let mut tokens = self.tokens.write().await;
        tokens.token = Some(body.token.clone());
        drop(tokens);
        if let Some(store) = &self.session_store {
            let mut session = store.session().await?;
            session.token = Some(body.token);
            store.write_session(&session).await?;
        }
        debug!("Access token refreshed");
        Ok(())
    }

    async fn send_authorized(&self, path: &str) -> Result<Response, AuthClientError> {
        let mut request: RequestBuilder = self.http.get(self.url(path));
        if let Some(token) = self.access_token().await {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    /// GET on a protected endpoint with the single refresh-and-retry.
    async fn authorized_get<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, AuthClientError> {
        let response = self.send_authorized(path).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::parse_bare(response).await;
        }

        let has_refresh = self.tokens.read().await.refresh_token.is_some();
        if !has_refresh {
            self.clear_tokens().await?;
            return Err(AuthClientError::SessionExpired);
        }

        debug!("Access token rejected, attempting one refresh");
        self.refresh_access_token().await?;

        let retry = self.send_authorized(path).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            warn!("Retry still unauthorized, forcing logout");
            self.clear_tokens().await?;
            return Err(AuthClientError::SessionExpired);
        }
        Self::parse_bare(retry).await
    }

    /// The logged-in user, per the auth service.
    pub async fn me(&self) -> Result<User, AuthClientError> {
        self.authorized_get("/api/auth/me").await
    }

    /// Posts the refresh token for revocation, then clears the session
    /// whatever the server said.
    pub async fn logout(&self) -> Result<(), AuthClientError> {
        let tokens = self.tokens.read().await;
        let token = tokens.token.clone();
        let refresh_token = tokens.refresh_token.clone();
        drop(tokens);

        if let Some(refresh_token) = refresh_token {
            let mut request = self
                .http
                .post(self.url("/api/auth/logout"))
                .json(&json!({ "refreshToken": refresh_token }));
            if let Some(token) = token {
                request = request.bearer_auth(token);
            }
            if let Err(e) = request.send().await {
                warn!("Logout request failed, clearing local session anyway: {e}");
            }
        }

        self.clear_tokens().await?;
        info!("Logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn user_body() -> serde_json::Value {
        json!({
            "id": "user-1",
            "firstName": "Jan",
            "lastName": "Kowalski",
            "role": "admin"
        })
    }

    #[tokio::test]
    async fn login_stores_the_token_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({ "login": "admin", "password": "admin123" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "access-1",
                "refreshToken": "refresh-1",
                "user": user_body()
            })))
            .mount(&server)
            .await;

        let client = AuthClient::new(server.uri());
        let user = client.login("admin", "admin123").await.unwrap();

        assert_eq!(user.id, "user-1");
        assert!(client.is_authenticated().await);
        assert_eq!(client.access_token().await.as_deref(), Some("access-1"));
    }

    #[tokio::test]
    async fn rejected_login_surfaces_the_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "invalid login or password"
            })))
            .mount(&server)
            .await;

        let client = AuthClient::new(server.uri());
        match client.login("admin", "nope").await {
            Err(AuthClientError::Rejected { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid login or password");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert!(!client.is_authenticated().await);
    }

    #[tokio::test]
    async fn logout_clears_tokens_even_when_server_is_down() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "access-1",
                "refreshToken": "refresh-1",
                "user": user_body()
            })))
            .mount(&server)
            .await;

        let client = AuthClient::new(server.uri());
        client.login("admin", "admin123").await.unwrap();

        // No logout mock mounted: wiremock answers 404, which we ignore
        client.logout().await.unwrap();
        assert!(!client.is_authenticated().await);
    }
}
