//! Credential store: persistence of principal records.
//!
//! The store is document-oriented from the caller's point of view: records
//! are addressed by id, email or reset code, and updated with typed patches.
//! Read-modify-write sequences rely on per-record atomicity only; there is no
//! cross-call locking.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::auth::{NewPrincipal, Principal, PrincipalPatch, PrincipalSummary, Role};

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;

/// Credential store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Email already exists: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations over principal records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Principal>>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Principal>>;

    async fn find_by_reset_code(&self, code: &str) -> StoreResult<Option<Principal>>;

    /// Insert a new principal. Fails with [`StoreError::Conflict`] on duplicate email.
    async fn create(&self, principal: NewPrincipal) -> StoreResult<Principal>;

    /// Apply a patch, returning the updated record or `None` for unknown ids.
    async fn update_by_id(&self, id: &str, patch: PrincipalPatch)
    -> StoreResult<Option<Principal>>;

    /// Remove a principal, returning the removed record.
    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<Principal>>;

    /// Summaries of every principal holding one of `roles`, oldest first.
    async fn list_by_roles(&self, roles: &[Role]) -> StoreResult<Vec<PrincipalSummary>>;

    /// Summaries of principals holding one of `roles` whose name contains
    /// `fragment`, compared case-insensitively, oldest first.
    async fn search_by_name(
        &self,
        roles: &[Role],
        fragment: &str,
    ) -> StoreResult<Vec<PrincipalSummary>>;

    async fn count_by_role(&self, role: Role) -> StoreResult<u64>;
}
