//! Password hashing via bcrypt.
//!
//! The async variants move the CPU-bound work onto tokio's blocking pool so
//! request handling threads are not stalled.

use std::sync::LazyLock;

use super::AuthError;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// bcrypt only reads the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash verified on logins that have no stored hash to check, so they cost
/// the same as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| bcrypt::hash("carebase-no-such-principal", BCRYPT_COST).ok());

/// Hash a password with bcrypt (cost 10).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

/// [`hash_password`] on the blocking pool.
pub async fn hash_password_async(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Internal(format!("hash task: {e}")))?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_async(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::Internal(format!("verify task: {e}")))?
}

/// Verify `password` against a fixed hash on the blocking pool. Never matches a
/// stored account.
pub async fn verify_dummy_async(password: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || match DUMMY_HASH.as_deref() {
        Some(hash) => verify_password(&password, hash),
        None => Ok(false),
    })
    .await
    .map_err(|e| AuthError::Internal(format!("verify task: {e}")))?
}

/// Check a new password and its confirmation.
pub fn check_new_password(password: &str, confirm: Option<&str>) -> Result<(), AuthError> {
    if confirm != Some(password) {
        return Err(AuthError::ValidationError(
            "Password and confirm password must be the same".into(),
        ));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::ValidationError(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::ValidationError(format!(
            "Password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("longpass1").unwrap();
        assert_ne!(hash, "longpass1");
        assert!(verify_password("longpass1", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn salts_differ() {
        let a = hash_password("same_password").unwrap();
        let b = hash_password("same_password").unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn async_variants_agree_with_sync() {
        let hash = hash_password_async("longpass1".into()).await.unwrap();
        assert!(verify_password_async("longpass1".into(), hash.clone()).await.unwrap());
        assert!(!verify_password_async("nope".into(), hash).await.unwrap());
    }

    #[test]
    fn verify_against_garbage_hash_is_an_error() {
        assert!(verify_password("x", "not-a-bcrypt-hash").is_err());
    }

    #[test]
    fn new_password_rules() {
        assert!(check_new_password("longpass1", Some("longpass1")).is_ok());
        assert!(check_new_password("longpass1", Some("longpass2")).is_err());
        assert!(check_new_password("longpass1", None).is_err());
        assert!(check_new_password("short", Some("short")).is_err());
    }

    #[test]
    fn passwords_past_bcrypt_input_limit_are_rejected() {
        let at_limit = "a".repeat(MAX_PASSWORD_BYTES);
        assert!(check_new_password(&at_limit, Some(&at_limit)).is_ok());

        let long = "a".repeat(MAX_PASSWORD_BYTES + 1);
        let err = check_new_password(&long, Some(&long)).unwrap_err();
        assert!(matches!(err, AuthError::ValidationError(m) if m.contains("72")));

        // 25 three-byte chars: short in chars, long in bytes
        let wide = "€".repeat(25);
        assert!(check_new_password(&wide, Some(&wide)).is_err());
    }

    #[tokio::test]
    async fn dummy_verification_does_real_work_and_never_matches() {
        assert!(DUMMY_HASH.is_some());
        assert!(!verify_dummy_async("longpass1".into()).await.unwrap());
        assert!(!verify_dummy_async("carebase-no-such-principal-x".into()).await.unwrap());
    }
}
