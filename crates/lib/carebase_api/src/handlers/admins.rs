//! Admin management handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use carebase_core::models::Role;

use super::{created, deleted, listed, updated};
use crate::AppState;
use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::auth::AuthenticatedPrincipal;
use crate::models::{
    CreatePrincipalRequest, MessageResponse, PrincipalListResponse, UpdatePrincipalRequest,
};
use crate::services::principals;

const ADMIN_ROLES: &[Role] = &[Role::Root, Role::Admin];

/// `GET /api/admins`
pub async fn list_admins(State(state): State<AppState>) -> AppResult<Json<PrincipalListResponse>> {
    Ok(listed(principals::list(state.store.as_ref(), ADMIN_ROLES).await?))
}

/// `POST /api/admins`: root creates an admin.
pub async fn create_admin(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreatePrincipalRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let admin = principals::create(state.store.as_ref(), Role::Admin, body).await?;
    Ok(created(&admin, "admin"))
}

/// `PATCH /api/admins/me`: the caller's own record; the id comes from the session.
pub async fn update_own_admin(
    State(state): State<AppState>,
    axum::Extension(principal): axum::Extension<AuthenticatedPrincipal>,
    ApiJson(body): ApiJson<UpdatePrincipalRequest>,
) -> AppResult<Json<MessageResponse>> {
    let (_, fields) =
        principals::update(state.store.as_ref(), principal.id(), ADMIN_ROLES, body).await?;
    Ok(updated(&fields))
}

/// `PATCH /api/admins/{id}`: root updates any admin.
pub async fn update_admin(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(body): ApiJson<UpdatePrincipalRequest>,
) -> AppResult<Json<MessageResponse>> {
    let (_, fields) = principals::update(state.store.as_ref(), &id, ADMIN_ROLES, body).await?;
    Ok(updated(&fields))
}

/// `DELETE /api/admins/{id}`: root removes an admin. Root records cannot be deleted here.
pub async fn delete_admin(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<MessageResponse>> {
    let removed = principals::delete(state.store.as_ref(), &id, &[Role::Admin]).await?;
    Ok(deleted(&removed))
}
