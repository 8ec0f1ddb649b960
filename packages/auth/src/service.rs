use crate::roster::Roster;
use crate::token::{
    TokenSigner, ACCESS_TOKEN_TTL_SECONDS, REFRESH_TOKEN_TTL_SECONDS,
};
use crate::AuthError;
use managme_core::types::User;
use serde::Serialize;
use std::collections::HashSet;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Result of a successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    pub user: User,
}

/// The authentication service: fixed roster, HS256 tokens, and a
/// revocable refresh-token list. Constructed once in `main` and shared
/// as a handle; restart loses all sessions.
pub struct AuthService {
    roster: Roster,
    signer: TokenSigner,
    refresh_tokens: RwLock<HashSet<String>>,
}

impl AuthService {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, AuthError> {
        Ok(AuthService::with_roster(Roster::seeded()?, secret))
    }

    pub fn with_roster(roster: Roster, secret: impl AsRef<[u8]>) -> Self {
        AuthService {
            roster,
            signer: TokenSigner::new(secret),
            refresh_tokens: RwLock::new(HashSet::new()),
        }
    }

    /// Verifies credentials and issues an access/refresh token pair.
    /// Unknown logins and bad passwords get the same error.
    pub async fn login(&self, login: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let entry = match self.roster.find_by_login(login) {
            Some(entry) if entry.verify_password(password) => entry,
            _ => {
                warn!(login = %login, "Rejected login attempt");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = self.signer.issue(&entry.user.id, ACCESS_TOKEN_TTL_SECONDS);
        let refresh_token = self.signer.issue(&entry.user.id, REFRESH_TOKEN_TTL_SECONDS);
        self.refresh_tokens
            .write()
            .await
            .insert(refresh_token.clone());

        info!(user_id = %entry.user.id, "User logged in");
        Ok(LoginOutcome {
            token,
            refresh_token,
            user: entry.user.clone(),
        })
    }

    /// Issues a fresh access token for a tracked, valid refresh token.
    /// The refresh token itself is not rotated.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        if !self.refresh_tokens.read().await.contains(refresh_token) {
            warn!("Refresh attempted with an untracked token");
            return Err(AuthError::TokenRevoked);
        }

        let claims = self.signer.verify(refresh_token)?;
        debug!(user_id = %claims.user_id, "Issued refreshed access token");
        Ok(self.signer.issue(&claims.user_id, ACCESS_TOKEN_TTL_SECONDS))
    }

    /// Drops the refresh token from the tracked list; no-op when absent.
    pub async fn logout(&self, refresh_token: &str) {
        let removed = self.refresh_tokens.write().await.remove(refresh_token);
        if removed {
            info!("Refresh token revoked");
        }
    }

    /// Verifies an access token, returning the user id it resolves to.
    pub fn verify_access(&self, token: &str) -> Result<String, AuthError> {
        let claims = self.signer.verify(token)?;
        Ok(claims.user_id)
    }

    pub fn user_by_id(&self, id: &str) -> Option<User> {
        self.roster.find_by_id(id).cloned()
    }

    /// All roster users with credentials stripped.
    pub fn users(&self) -> Vec<User> {
        self.roster.users()
    }

    #[doc(hidden)]
    pub async fn is_tracked(&self, refresh_token: &str) -> bool {
        self.refresh_tokens.read().await.contains(refresh_token)
    }
}
