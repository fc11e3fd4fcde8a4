//! Declarative role requirements evaluated after authentication.
//!
//! Each protected route carries a [`Capability`]; [`require_capability`] is
//! the single place role checks happen.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use carebase_core::models::Role;

use super::auth::AuthenticatedPrincipal;
use crate::error::AppError;

/// Roles allowed to perform an action, and the message shown to everyone else.
#[derive(Debug, Clone, Copy)]
pub struct Capability {
    pub any_of: &'static [Role],
    pub denied: &'static str,
}

impl Capability {
    pub fn allows(&self, role: Role) -> bool {
        self.any_of.contains(&role)
    }

    pub fn check(&self, principal: &AuthenticatedPrincipal) -> Result<(), AppError> {
        if self.allows(principal.role()) {
            Ok(())
        } else {
            debug!(principal_id = principal.id(), role = %principal.role(), "capability denied");
            Err(AppError::Forbidden(self.denied.to_string()))
        }
    }
}

pub const ANY_PRINCIPAL: Capability = Capability {
    any_of: &[Role::Root, Role::Admin, Role::Doctor, Role::Patient],
    denied: "You do not have permission to perform this action",
};

pub const LIST_ADMINS: Capability = Capability {
    any_of: &[Role::Root, Role::Admin],
    denied: "You do not have permission to view admins",
};

pub const MANAGE_ADMINS: Capability = Capability {
    any_of: &[Role::Root],
    denied: "Only the root user can manage admins",
};

pub const UPDATE_OWN_ADMIN: Capability = Capability {
    any_of: &[Role::Root, Role::Admin],
    denied: "Only admins can update admin details",
};

pub const MANAGE_DOCTORS: Capability = Capability {
    any_of: &[Role::Root, Role::Admin],
    denied: "You do not have enough permission to manage doctors",
};

pub const UPDATE_OWN_DOCTOR: Capability = Capability {
    any_of: &[Role::Doctor],
    denied: "Only doctors can update doctor details",
};

pub const LIST_PATIENTS: Capability = Capability {
    any_of: &[Role::Root, Role::Admin, Role::Doctor],
    denied: "You do not have permission to view patients",
};

pub const MANAGE_PATIENTS: Capability = Capability {
    any_of: &[Role::Root, Role::Admin],
    denied: "You do not have permission to delete patients",
};

pub const UPDATE_OWN_PATIENT: Capability = Capability {
    any_of: &[Role::Patient],
    denied: "Only patients can update patient details",
};

/// Axum middleware: enforces the route's capability against the principal
/// attached by [`super::auth::require_auth`].
pub async fn require_capability(
    State(capability): State<Capability>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = request
        .extensions()
        .get::<AuthenticatedPrincipal>()
        .ok_or_else(|| AppError::Unauthenticated("Please login first".into()))?;

    capability.check(principal)?;

    Ok(next.run(request).await)
}
