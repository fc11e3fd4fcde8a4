//! Authentication service: login, password reset flow and root bootstrap.

use chrono::Utc;
use tracing::{debug, info, warn};

use carebase_core::auth::AuthError;
use carebase_core::auth::jwt::TokenService;
use carebase_core::auth::password::{
    check_new_password, hash_password_async, verify_dummy_async, verify_password_async,
};
use carebase_core::auth::validation::normalize_email;
use carebase_core::mail::Mailer;
use carebase_core::mail::templates::{RESET_SUBJECT, reset_link, reset_password_email};
use carebase_core::models::{NewPrincipal, Principal, PrincipalPatch, ResetTicket, Role};
use carebase_core::store::CredentialStore;

use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};
use crate::models::{LoginRequest, ResetPasswordRequest};

const INVALID_RESET_CODE: &str = "Password reset token is invalid or has expired";

/// Login endpoint family. Each realm accepts a fixed set of roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Realm {
    Admin,
    Doctor,
    Patient,
}

impl Realm {
    pub fn accepts(self, role: Role) -> bool {
        match self {
            Realm::Admin => matches!(role, Role::Root | Role::Admin),
            Realm::Doctor => role == Role::Doctor,
            Realm::Patient => role == Role::Patient,
        }
    }
}

/// Authenticate with email + password inside `realm`.
///
/// Unknown email, wrong password and wrong realm all fail with the same
/// credential error. Returns the signed session token and the principal.
pub async fn login(
    store: &dyn CredentialStore,
    tokens: &TokenService,
    realm: Realm,
    request: LoginRequest,
) -> AppResult<(String, Principal)> {
    let email = normalize_email(&request.email)?;

    let Some(principal) = store.find_by_email(&email).await? else {
        verify_dummy_async(request.password).await?;
        debug!(?realm, "login rejected: unknown email");
        return Err(AuthError::CredentialError.into());
    };

    // Verified before the realm check so every rejection costs one bcrypt run.
    let password_ok =
        verify_password_async(request.password, principal.password_hash.clone()).await?;

    if !realm.accepts(principal.role) {
        debug!(?realm, principal_id = %principal.id, role = %principal.role, "login rejected: wrong realm");
        return Err(AuthError::CredentialError.into());
    }

    if !password_ok {
        debug!(principal_id = %principal.id, "login rejected: wrong password");
        return Err(AuthError::CredentialError.into());
    }

    let token = tokens.issue(&principal.id, principal.role)?;
    info!(principal_id = %principal.id, role = %principal.role, "login succeeded");
    Ok((token, principal))
}

/// Issue a reset ticket for `email` and mail the reset link.
///
/// The ticket is persisted before dispatch; a mail failure leaves it valid
/// until it expires and surfaces as [`AppError::MailDelivery`].
pub async fn forget_password(
    store: &dyn CredentialStore,
    mailer: &dyn Mailer,
    config: &ApiConfig,
    raw_email: &str,
) -> AppResult<()> {
    let email = normalize_email(raw_email)?;

    let principal = store
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("No account found with that email".into()))?;

    let ticket = ResetTicket::issue(Utc::now());
    let link = reset_link(&config.reset_url_base, &ticket.code);

    store
        .update_by_id(&principal.id, PrincipalPatch::issue_reset(ticket))
        .await?
        .ok_or_else(|| AppError::NotFound("No account found with that email".into()))?;
    info!(principal_id = %principal.id, "reset ticket issued");

    let body = reset_password_email(&link, &config.hospital_name);
    if let Err(e) = mailer
        .send(&principal.email, principal.display_name(), RESET_SUBJECT, &body)
        .await
    {
        warn!(principal_id = %principal.id, error = %e, "reset email dispatch failed");
        return Err(e.into());
    }
    Ok(())
}

/// Redeem a reset code and set a new password.
///
/// The ticket is cleared on both the success and the expired path. Two
/// concurrent redemptions of the same code are not serialised.
pub async fn reset_password(
    store: &dyn CredentialStore,
    code: &str,
    request: ResetPasswordRequest,
) -> AppResult<()> {
    check_new_password(&request.password, request.confirm_password.as_deref())?;

    let principal = store
        .find_by_reset_code(code)
        .await?
        .ok_or_else(|| AppError::InvalidOrExpired(INVALID_RESET_CODE.into()))?;

    let expired = principal
        .reset
        .as_ref()
        .is_none_or(|ticket| ticket.is_expired_at(Utc::now()));
    if expired {
        store
            .update_by_id(&principal.id, PrincipalPatch::clear_reset())
            .await?;
        info!(principal_id = %principal.id, "expired reset ticket cleared");
        return Err(AppError::InvalidOrExpired(INVALID_RESET_CODE.into()));
    }

    let password_hash = hash_password_async(request.password).await?;
    let patch = PrincipalPatch {
        password_hash: Some(password_hash),
        ..PrincipalPatch::clear_reset()
    };
    store
        .update_by_id(&principal.id, patch)
        .await?
        .ok_or_else(|| AppError::InvalidOrExpired(INVALID_RESET_CODE.into()))?;
    info!(principal_id = %principal.id, "reset ticket redeemed");
    Ok(())
}

/// Create the root principal unless one exists. Returns whether one was created.
pub async fn bootstrap_root(
    store: &dyn CredentialStore,
    email: &str,
    password: &str,
    name: Option<&str>,
) -> AppResult<bool> {
    if store.count_by_role(Role::Root).await? > 0 {
        debug!("root principal already present");
        return Ok(false);
    }

    let email = normalize_email(email)?;
    check_new_password(password, Some(password))?;
    let password_hash = hash_password_async(password.to_string()).await?;

    let root = store
        .create(NewPrincipal {
            name: name.map(str::to_string),
            email,
            password_hash,
            role: Role::Root,
        })
        .await?;
    info!(principal_id = %root.id, "root principal created");
    Ok(true)
}
