// ABOUTME: Authentication for ManagMe: seeded roster, HS256 tokens, refresh list
// ABOUTME: Exposes the AuthService handle the auth server mounts as state

pub mod roster;
pub mod service;
pub mod token;

pub use roster::{hash_password, verify_password, Roster, RosterEntry};
pub use service::{AuthService, LoginOutcome};
pub use token::{
    Claims, TokenError, TokenSigner, ACCESS_TOKEN_TTL_SECONDS, REFRESH_TOKEN_TTL_SECONDS,
};

use thiserror::Error;

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid login or password")]
    InvalidCredentials,
    #[error("refresh token is not tracked")]
    TokenRevoked,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("password hashing failed: {0}")]
    Hash(String),
}
