//! Session token issuance and verification.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{info, warn};

use super::AuthError;
use crate::models::auth::{Role, SessionClaims};

/// Session token lifetime: 1 hour. Not configurable per call.
pub const SESSION_TOKEN_EXPIRY_SECS: i64 = 60 * 60;

/// Stateless signer/verifier for session tokens (HS256).
///
/// Holds the process-wide secret, read-only after construction.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a signed token for the principal, expiring one hour from now.
    pub fn issue(&self, principal_id: &str, role: Role) -> Result<String, AuthError> {
        self.issue_at(principal_id, role, Utc::now())
    }

    /// Issue a token as if it had been signed at `issued_at`.
    pub fn issue_at(
        &self,
        principal_id: &str,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = SessionClaims {
            sub: principal_id.to_string(),
            role,
            exp: (issued_at + Duration::seconds(SESSION_TOKEN_EXPIRY_SECS)).timestamp(),
            iat: issued_at.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))
    }

    /// Verify a token, returning the claims on success.
    ///
    /// Malformed, tampered and expired tokens all yield `None`.
    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .ok()
            .map(|data| data.claims)
    }
}

/// Resolve the JWT secret: env var `JWT_SECRET`, then `AUTH_SECRET`, then the
/// secret file under the data directory, generating one on first run.
pub fn resolve_jwt_secret() -> String {
    ["JWT_SECRET", "AUTH_SECRET"]
        .into_iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|secret| !secret.is_empty())
        .unwrap_or_else(|| load_or_generate_secret(&jwt_secret_path()))
}

fn load_or_generate_secret(path: &Path) -> String {
    if let Ok(existing) = std::fs::read_to_string(path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    match persist_secret(path, &secret) {
        Ok(()) => info!(path = %path.display(), "generated new JWT secret"),
        // Sessions will not survive a restart.
        Err(e) => warn!(
            path = %path.display(),
            error = %e,
            "could not persist generated JWT secret"
        ),
    }
    secret
}

fn persist_secret(path: &Path, secret: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, secret)
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("carebase")
        .join("jwt-secret")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"test-secret")
    }

    #[test]
    fn issue_then_verify_recovers_principal_and_role() {
        let tokens = service();
        let token = tokens.issue("principal-1", Role::Doctor).unwrap();
        let claims = tokens.verify(&token).expect("fresh token verifies");
        assert_eq!(claims.sub, "principal-1");
        assert_eq!(claims.role, Role::Doctor);
        assert_eq!(claims.exp - claims.iat, SESSION_TOKEN_EXPIRY_SECS);
    }

    #[test]
    fn token_older_than_one_hour_is_rejected() {
        let tokens = service();
        let issued = Utc::now() - Duration::seconds(SESSION_TOKEN_EXPIRY_SECS + 5);
        let token = tokens.issue_at("principal-1", Role::Admin, issued).unwrap();
        assert!(tokens.verify(&token).is_none());
    }

    #[test]
    fn token_just_inside_lifetime_is_accepted() {
        let tokens = service();
        let issued = Utc::now() - Duration::seconds(SESSION_TOKEN_EXPIRY_SECS - 60);
        let token = tokens.issue_at("principal-1", Role::Admin, issued).unwrap();
        assert!(tokens.verify(&token).is_some());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = service().issue("principal-1", Role::Root).unwrap();
        let other = TokenService::new(b"another-secret");
        assert!(other.verify(&token).is_none());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let tokens = service();
        let token = tokens.issue("principal-1", Role::Patient).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = tokens.issue("principal-2", Role::Root).unwrap();
        let forged_payload = forged.split('.').nth(1).unwrap().to_string();
        parts[1] = &forged_payload;
        assert!(tokens.verify(&parts.join(".")).is_none());
    }

    #[test]
    fn generated_secret_is_persisted_and_reused() {
        let dir = std::env::temp_dir().join(format!("carebase-jwt-{}", uuid::Uuid::now_v7()));
        let path = dir.join("nested").join("jwt-secret");

        let first = load_or_generate_secret(&path);
        assert_eq!(first.len(), 64);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
        assert_eq!(load_or_generate_secret(&path), first);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unwritable_secret_path_still_yields_a_secret() {
        let dir = std::env::temp_dir().join(format!("carebase-jwt-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        // A regular file where a directory is expected.
        let blocker = dir.join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let secret = load_or_generate_secret(&blocker.join("jwt-secret"));
        assert_eq!(secret.len(), 64);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn malformed_input_is_rejected_without_panicking() {
        let tokens = service();
        for input in ["", "not-a-jwt", "a.b.c", "...."] {
            assert!(tokens.verify(input).is_none());
        }
    }
}
