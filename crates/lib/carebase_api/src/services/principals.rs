//! Principal management: create, update, delete and list admins, doctors and patients.

use tracing::info;

use carebase_core::auth::password::{check_new_password, hash_password_async};
use carebase_core::auth::validation::normalize_email;
use carebase_core::models::{NewPrincipal, Principal, PrincipalPatch, PrincipalSummary, Role};
use carebase_core::store::CredentialStore;

use crate::error::{AppError, AppResult};
use crate::models::{CreatePrincipalRequest, UpdatePrincipalRequest};

/// Create a principal with `role`. The password is hashed before it reaches the store.
pub async fn create(
    store: &dyn CredentialStore,
    role: Role,
    request: CreatePrincipalRequest,
) -> AppResult<Principal> {
    let email = normalize_email(&request.email)?;
    check_new_password(&request.password, request.confirm_password.as_deref())?;
    let password_hash = hash_password_async(request.password).await?;

    let principal = store
        .create(NewPrincipal {
            name: clean_name(request.name),
            email,
            password_hash,
            role,
        })
        .await?;
    info!(principal_id = %principal.id, role = %role, "principal created");
    Ok(principal)
}

/// Update the principal `id`, which must hold one of `target_roles`.
///
/// Returns the updated record and the names of the fields that changed.
pub async fn update(
    store: &dyn CredentialStore,
    id: &str,
    target_roles: &[Role],
    request: UpdatePrincipalRequest,
) -> AppResult<(Principal, Vec<&'static str>)> {
    let (patch, fields) = build_patch(request).await?;

    find_in_roles(store, id, target_roles).await?;

    let principal = store
        .update_by_id(id, patch)
        .await?
        .ok_or_else(|| not_found(target_roles))?;
    info!(principal_id = %principal.id, fields = ?fields, "principal updated");
    Ok((principal, fields))
}

/// Delete the principal `id`, which must hold one of `target_roles`.
pub async fn delete(
    store: &dyn CredentialStore,
    id: &str,
    target_roles: &[Role],
) -> AppResult<Principal> {
    find_in_roles(store, id, target_roles).await?;

    let removed = store
        .delete_by_id(id)
        .await?
        .ok_or_else(|| not_found(target_roles))?;
    info!(principal_id = %removed.id, role = %removed.role, "principal deleted");
    Ok(removed)
}

pub async fn list(store: &dyn CredentialStore, roles: &[Role]) -> AppResult<Vec<PrincipalSummary>> {
    Ok(store.list_by_roles(roles).await?)
}

/// Summary of the principal `id`, which must hold one of `target_roles`.
pub async fn get(
    store: &dyn CredentialStore,
    id: &str,
    target_roles: &[Role],
) -> AppResult<PrincipalSummary> {
    Ok(find_in_roles(store, id, target_roles).await?.summary())
}

/// Principals holding one of `roles` whose name contains `name`, ignoring case.
pub async fn search(
    store: &dyn CredentialStore,
    roles: &[Role],
    name: Option<&str>,
) -> AppResult<Vec<PrincipalSummary>> {
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("No query is given".into()))?;
    let found = store.search_by_name(roles, name).await?;
    if found.is_empty() {
        return Err(not_found(roles));
    }
    Ok(found)
}

/// Current principal by id, as carried in the session token.
pub async fn me(store: &dyn CredentialStore, id: &str) -> AppResult<PrincipalSummary> {
    store
        .find_by_id(id)
        .await?
        .map(|p| p.summary())
        .ok_or_else(|| AppError::NotFound("Account no longer exists".into()))
}

async fn find_in_roles(
    store: &dyn CredentialStore,
    id: &str,
    target_roles: &[Role],
) -> AppResult<Principal> {
    store
        .find_by_id(id)
        .await?
        .filter(|p| target_roles.contains(&p.role))
        .ok_or_else(|| not_found(target_roles))
}

fn not_found(target_roles: &[Role]) -> AppError {
    let noun = match target_roles.first() {
        Some(Role::Doctor) => "Doctor",
        Some(Role::Patient) => "Patient",
        _ => "Admin",
    };
    AppError::NotFound(format!("{noun} not found"))
}

fn clean_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

/// Validate an update body and turn it into a typed patch.
async fn build_patch(request: UpdatePrincipalRequest) -> AppResult<(PrincipalPatch, Vec<&'static str>)> {
    let mut patch = PrincipalPatch::default();
    let mut fields = Vec::new();

    if let Some(name) = clean_name(request.name) {
        patch.name = Some(name);
        fields.push("name");
    }
    if let Some(email) = request.email {
        patch.email = Some(normalize_email(&email)?);
        fields.push("email");
    }
    if let Some(password) = request.password {
        check_new_password(&password, request.confirm_password.as_deref())?;
        patch.password_hash = Some(hash_password_async(password).await?);
        fields.push("password");
    }

    if patch.is_empty() {
        return Err(AppError::Validation("Empty fields".into()));
    }
    Ok((patch, fields))
}
