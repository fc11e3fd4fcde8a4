//! Authentication middleware: session cookie extraction and JWT verification.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use carebase_core::models::{Role, SessionClaims};

use crate::AppState;
use crate::error::AppError;

/// Principal attached to request extensions once the session verified.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal(pub SessionClaims);

impl AuthenticatedPrincipal {
    /// Principal id from the token. Ownership checks use this, never a client-supplied id.
    pub fn id(&self) -> &str {
        &self.0.sub
    }

    pub fn role(&self) -> Role {
        self.0.role
    }
}

/// Axum middleware: reads the `auth_token` cookie, verifies it, and injects
/// [`AuthenticatedPrincipal`] into request extensions.
///
/// No cookie and an unusable cookie are both 403, with different messages.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(request.headers());

    let token = state
        .cookies
        .extract(&jar)
        .ok_or_else(|| AppError::Unauthenticated("Please login first".into()))?;

    let claims = state.tokens.verify(&token).ok_or_else(|| {
        debug!("session token rejected");
        AppError::Unauthenticated("Your session expired or the token is invalid, login again".into())
    })?;

    request
        .extensions_mut()
        .insert(AuthenticatedPrincipal(claims));

    Ok(next.run(request).await)
}
