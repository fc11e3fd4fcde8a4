//! Session and password-reset request handlers.

use axum::Json;
use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use serde_json::{Map, Value};

use crate::AppState;
use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::auth::AuthenticatedPrincipal;
use crate::models::{
    ForgetPasswordRequest, LoginRequest, MessageResponse, PrincipalResponse, ResetPasswordRequest,
};
use crate::services::auth::{self, Realm};
use crate::services::principals;

async fn login_in(
    state: AppState,
    jar: CookieJar,
    realm: Realm,
    body: Map<String, Value>,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    let request = LoginRequest::try_from(body)?;
    let (token, principal) = auth::login(state.store.as_ref(), &state.tokens, realm, request).await?;
    let jar = state.cookies.attach(jar, &token);
    Ok((
        jar,
        Json(MessageResponse::ok(format!("Hello {}", principal.display_name()))),
    ))
}

/// `POST /api/admins/login`: root and admin login.
pub async fn login_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<Map<String, Value>>,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    login_in(state, jar, Realm::Admin, body).await
}

/// `POST /api/doctors/login`
pub async fn login_doctor(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<Map<String, Value>>,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    login_in(state, jar, Realm::Doctor, body).await
}

/// `POST /api/patients/login`
pub async fn login_patient(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<Map<String, Value>>,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    login_in(state, jar, Realm::Patient, body).await
}

/// `DELETE /api/logout`: clear the session cookie. Works without a session.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    (
        state.cookies.clear(jar),
        Json(MessageResponse::ok("Successfully logged out.")),
    )
}

/// `PATCH /api/forget-password`: issue a reset ticket and email the link.
pub async fn forget_password(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ForgetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    auth::forget_password(
        state.store.as_ref(),
        state.mailer.as_ref(),
        &state.config,
        &body.email,
    )
    .await?;
    Ok(Json(MessageResponse::ok(
        "Password reset link sent to your email",
    )))
}

/// `PATCH /api/reset-password/{code}`
pub async fn reset_password(
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
    ApiJson(body): ApiJson<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    auth::reset_password(state.store.as_ref(), &code, body).await?;
    Ok(Json(MessageResponse::ok("Password has been reset successfully")))
}

/// `GET /api/me`: summary of the session's principal.
pub async fn me(
    State(state): State<AppState>,
    axum::Extension(principal): axum::Extension<AuthenticatedPrincipal>,
) -> AppResult<Json<PrincipalResponse>> {
    let summary = principals::me(state.store.as_ref(), principal.id()).await?;
    Ok(Json(PrincipalResponse {
        status: true,
        principal: summary,
    }))
}
