//! Request handlers.

pub mod admins;
pub mod auth;
pub mod doctors;
pub mod patients;

use axum::Json;
use axum::http::StatusCode;

use carebase_core::models::{Principal, PrincipalSummary};

use crate::models::{MessageResponse, PrincipalListResponse};

fn created(principal: &Principal, label: &str) -> (StatusCode, Json<MessageResponse>) {
    (
        StatusCode::CREATED,
        Json(MessageResponse::ok(format!(
            "{} {label} created successfully",
            principal.display_name()
        ))),
    )
}

fn updated(fields: &[&str]) -> Json<MessageResponse> {
    Json(MessageResponse::ok(format!(
        "{} updated successfully",
        fields.join(", ")
    )))
}

fn deleted(principal: &Principal) -> Json<MessageResponse> {
    Json(MessageResponse::ok(format!(
        "{} deleted successfully",
        principal.display_name()
    )))
}

fn listed(principals: Vec<PrincipalSummary>) -> Json<PrincipalListResponse> {
    Json(PrincipalListResponse {
        status: true,
        principals,
    })
}
