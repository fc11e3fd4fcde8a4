//! Patient handlers, including public self-registration.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use carebase_core::models::Role;

use super::{created, deleted, listed, updated};
use crate::AppState;
use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::auth::AuthenticatedPrincipal;
use crate::models::{
    CreatePrincipalRequest, MessageResponse, NameSearchQuery, PrincipalListResponse,
    PrincipalResponse, UpdatePrincipalRequest,
};
use crate::services::principals;

const PATIENT: &[Role] = &[Role::Patient];

/// `POST /api/patients/register`: public; always creates role `patient`.
pub async fn register_patient(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreatePrincipalRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let patient = principals::create(state.store.as_ref(), Role::Patient, body).await?;
    Ok(created(&patient, "patient"))
}

pub async fn list_patients(State(state): State<AppState>) -> AppResult<Json<PrincipalListResponse>> {
    Ok(listed(principals::list(state.store.as_ref(), PATIENT).await?))
}

/// `GET /api/patients/search?name=`: case-insensitive substring match on the name.
pub async fn search_patients(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<NameSearchQuery>,
) -> AppResult<Json<PrincipalListResponse>> {
    let found = principals::search(state.store.as_ref(), PATIENT, query.name.as_deref()).await?;
    Ok(listed(found))
}

/// `GET /api/patients/{id}`
pub async fn get_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<PrincipalResponse>> {
    let patient = principals::get(state.store.as_ref(), &id, PATIENT).await?;
    Ok(Json(PrincipalResponse {
        status: true,
        principal: patient,
    }))
}

pub async fn update_own_patient(
    State(state): State<AppState>,
    axum::Extension(principal): axum::Extension<AuthenticatedPrincipal>,
    ApiJson(body): ApiJson<UpdatePrincipalRequest>,
) -> AppResult<Json<MessageResponse>> {
    let (_, fields) =
        principals::update(state.store.as_ref(), principal.id(), PATIENT, body).await?;
    Ok(updated(&fields))
}

pub async fn delete_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<Json<MessageResponse>> {
    let removed = principals::delete(state.store.as_ref(), &id, PATIENT).await?;
    Ok(deleted(&removed))
}
