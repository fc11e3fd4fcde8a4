//! Doctor management handlers.

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
    CreatePrincipalRequest, MessageResponse, PrincipalListResponse, PrincipalResponse,
    UpdatePrincipalRequest,
};
use crate::services::principals;

const DOCTOR: &[Role] = &[Role::Doctor];

pub async fn list_doctors(State(state): State<AppState>) -> AppResult<Json<PrincipalListResponse>> {
    Ok(listed(principals::list(state.store.as_ref(), DOCTOR).await?))
}

/// `GET /api/doctors/{id}`
pub async fn get_doctor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<PrincipalResponse>> {
    let doctor = principals::get(state.store.as_ref(), &id, DOCTOR).await?;
    Ok(Json(PrincipalResponse {
        status: true,
        principal: doctor,
    }))
}

pub async fn create_doctor(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreatePrincipalRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let doctor = principals::create(state.store.as_ref(), Role::Doctor, body).await?;
    Ok(created(&doctor, "doctor"))
}

pub async fn update_own_doctor(
    State(state): State<AppState>,
    axum::Extension(principal): axum::Extension<AuthenticatedPrincipal>,
    ApiJson(body): ApiJson<UpdatePrincipalRequest>,
) -> AppResult<Json<MessageResponse>> {
    let (_, fields) =
        principals::update(state.store.as_ref(), principal.id(), DOCTOR, body).await?;
    Ok(updated(&fields))
}

pub async fn update_doctor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(body): ApiJson<UpdatePrincipalRequest>,
) -> AppResult<Json<MessageResponse>> {
    let (_, fields) = principals::update(state.store.as_ref(), &id, DOCTOR, body).await?;
    Ok(updated(&fields))
}

pub async fn delete_doctor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<MessageResponse>> {
    let removed = principals::delete(state.store.as_ref(), &id, DOCTOR).await?;
    Ok(deleted(&removed))
}
