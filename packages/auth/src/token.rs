// ABOUTME: HS256 token signing and verification for the auth service
// ABOUTME: Tokens are JWT-shaped and carry {userId, exp} claims

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Access tokens live for 15 minutes
pub const ACCESS_TOKEN_TTL_SECONDS: i64 = 15 * 60;
/// Refresh tokens live for 7 days
pub const REFRESH_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Token verification errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

/// Claims carried by every token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub exp: i64,
}

/// Signs and verifies HS256 tokens with a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
}

impl TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        TokenSigner {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts keys of any length")
    }

    /// Issues a token for the given user, expiring `ttl_seconds` from now.
    pub fn issue(&self, user_id: &str, ttl_seconds: i64) -> String {
        let claims = Claims {
            user_id: user_id.to_string(),
            exp: (Utc::now() + Duration::seconds(ttl_seconds)).timestamp(),
        };

        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&claims).expect("claims always serialize"),
        );
        let signing_input = format!("{header}.{payload}");

        let mut mac = self.mac();
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{signing_input}.{signature}")
    }

    /// Verifies signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (header, payload, signature) = match (parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(p), Some(s)) if parts.next().is_none() => (h, p, s),
            _ => return Err(TokenError::Malformed),
        };

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac();
        mac.update(format!("{header}.{payload}").as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if claims.exp < Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn issue_and_verify_round_trip() {
        let signer = TokenSigner::new("test-secret");
        let token = signer.issue("user-1", ACCESS_TOKEN_TTL_SECONDS);

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.user_id, "user-1");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn expired_token_is_rejected() {
        let signer = TokenSigner::new("test-secret");
        let token = signer.issue("user-1", -10);
        assert_eq!(signer.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn wrong_secret_fails_signature_check() {
        let signer = TokenSigner::new("secret-a");
        let other = TokenSigner::new("secret-b");
        let token = signer.issue("user-1", 60);
        assert_eq!(other.verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let signer = TokenSigner::new("test-secret");
        let token = signer.issue("user-1", 60);

        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(r#"{"userId":"user-2","exp":9999999999}"#);
        parts[1] = &forged;
        let forged_token = parts.join(".");

        assert_eq!(signer.verify(&forged_token), Err(TokenError::BadSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        let signer = TokenSigner::new("test-secret");
        assert_eq!(signer.verify("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(signer.verify("a.b"), Err(TokenError::Malformed));
        assert_eq!(signer.verify("a.b.c.d"), Err(TokenError::Malformed));
    }
}
