//! In-process credential store.
//!
//! Used by the test suites and when the server runs without `DATABASE_URL`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CredentialStore, StoreError, StoreResult};
use crate::models::auth::{NewPrincipal, Principal, PrincipalPatch, PrincipalSummary, Role};

/// Principals keyed by id behind a single async lock.
#[derive(Default)]
pub struct MemoryCredentialStore {
    records: RwLock<HashMap<String, Principal>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn oldest_first<'a>(principals: impl Iterator<Item = &'a Principal>) -> Vec<PrincipalSummary> {
    let mut found: Vec<PrincipalSummary> = principals.map(Principal::summary).collect();
    found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    found
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Principal>> {
        let records = self.records.read().await;
        Ok(records.values().find(|p| p.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Principal>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn find_by_reset_code(&self, code: &str) -> StoreResult<Option<Principal>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|p| p.reset.as_ref().is_some_and(|t| t.code == code))
            .cloned())
    }

    async fn create(&self, principal: NewPrincipal) -> StoreResult<Principal> {
        let mut records = self.records.write().await;
        if records.values().any(|p| p.email == principal.email) {
            return Err(StoreError::Conflict(principal.email));
        }
        let now = Utc::now();
        let record = Principal {
            id: Uuid::now_v7().to_string(),
            name: principal.name,
            email: principal.email,
            password_hash: principal.password_hash,
            role: principal.role,
            reset: None,
            created_at: now,
            updated_at: now,
        };
        records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update_by_id(
        &self,
        id: &str,
        patch: PrincipalPatch,
    ) -> StoreResult<Option<Principal>> {
        let mut records = self.records.write().await;
        if let Some(email) = &patch.email
            && records.values().any(|p| p.id != id && &p.email == email)
        {
            return Err(StoreError::Conflict(email.clone()));
        }
        let Some(record) = records.get_mut(id) else {
            return Ok(None);
        };
        patch.apply(record, Utc::now());
        Ok(Some(record.clone()))
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<Principal>> {
        Ok(self.records.write().await.remove(id))
    }

    async fn list_by_roles(&self, roles: &[Role]) -> StoreResult<Vec<PrincipalSummary>> {
        let records = self.records.read().await;
        Ok(oldest_first(
            records.values().filter(|p| roles.contains(&p.role)),
        ))
    }

    async fn search_by_name(
        &self,
        roles: &[Role],
        fragment: &str,
    ) -> StoreResult<Vec<PrincipalSummary>> {
        let needle = fragment.to_lowercase();
        let records = self.records.read().await;
        Ok(oldest_first(records.values().filter(|p| {
            roles.contains(&p.role)
                && p.name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
        })))
    }

    async fn count_by_role(&self, role: Role) -> StoreResult<u64> {
        let records = self.records.read().await;
        Ok(records.values().filter(|p| p.role == role).count() as u64)
    }
}
