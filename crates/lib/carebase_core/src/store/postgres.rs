//! PostgreSQL credential store (`principals` table).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{CredentialStore, StoreError, StoreResult};
use crate::models::auth::{
    NewPrincipal, Principal, PrincipalPatch, PrincipalSummary, ResetTicket, ResetUpdate, Role,
};

const PRINCIPAL_COLUMNS: &str =
    "id, name, email, password_hash, role, reset_code, reset_expires_at, created_at, updated_at";

/// Credential store backed by a sqlx connection pool.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PrincipalRow {
    id: Uuid,
    name: Option<String>,
    email: String,
    password_hash: String,
    role: String,
    reset_code: Option<String>,
    reset_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PrincipalRow> for Principal {
    type Error = StoreError;

    fn try_from(row: PrincipalRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(StoreError::Corrupt)?;
        let reset = match (row.reset_code, row.reset_expires_at) {
            (Some(code), Some(expires_at)) => Some(ResetTicket { code, expires_at }),
            (None, None) => None,
            _ => {
                return Err(StoreError::Corrupt(format!(
                    "principal {} has a partial reset ticket",
                    row.id
                )));
            }
        };
        Ok(Principal {
            id: row.id.to_string(),
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            reset,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: Uuid,
    name: Option<String>,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SummaryRow> for PrincipalSummary {
    type Error = StoreError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        Ok(PrincipalSummary {
            id: row.id.to_string(),
            name: row.name,
            email: row.email,
            role: row.role.parse().map_err(StoreError::Corrupt)?,
            created_at: row.created_at,
        })
    }
}

/// Map unique-constraint violations to [`StoreError::Conflict`].
fn map_write_error(e: sqlx::Error, email: Option<&str>) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(email.unwrap_or_default().to_string())
        }
        _ => StoreError::Db(e),
    }
}

/// Malformed ids cannot match any row.
fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

impl PgCredentialStore {
    async fn find_one(&self, column: &str, value: &str) -> StoreResult<Option<Principal>> {
        let sql = format!("SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE {column} = $1");
        let row = sqlx::query_as::<_, PrincipalRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Principal::try_from).transpose()
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Principal>> {
        self.find_one("email", email).await
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Principal>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let sql = format!("SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE id = $1");
        let row = sqlx::query_as::<_, PrincipalRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Principal::try_from).transpose()
    }

    async fn find_by_reset_code(&self, code: &str) -> StoreResult<Option<Principal>> {
        self.find_one("reset_code", code).await
    }

    async fn create(&self, principal: NewPrincipal) -> StoreResult<Principal> {
        let sql = format!(
            "INSERT INTO principals (name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) RETURNING {PRINCIPAL_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PrincipalRow>(&sql)
            .bind(&principal.name)
            .bind(&principal.email)
            .bind(&principal.password_hash)
            .bind(principal.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, Some(&principal.email)))?;
        Principal::try_from(row)
    }

    async fn update_by_id(
        &self,
        id: &str,
        patch: PrincipalPatch,
    ) -> StoreResult<Option<Principal>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let email = patch.email.clone();

        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE principals SET updated_at = now()");
        if let Some(name) = patch.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(email) = patch.email {
            qb.push(", email = ").push_bind(email);
        }
        if let Some(hash) = patch.password_hash {
            qb.push(", password_hash = ").push_bind(hash);
        }
        match patch.reset {
            Some(ResetUpdate::Issue(ticket)) => {
                qb.push(", reset_code = ").push_bind(ticket.code);
                qb.push(", reset_expires_at = ").push_bind(ticket.expires_at);
            }
            Some(ResetUpdate::Clear) => {
                qb.push(", reset_code = NULL, reset_expires_at = NULL");
            }
            None => {}
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(format!(" RETURNING {PRINCIPAL_COLUMNS}"));

        let row = qb
            .build_query_as::<PrincipalRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, email.as_deref()))?;
        row.map(Principal::try_from).transpose()
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<Principal>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        let sql = format!("DELETE FROM principals WHERE id = $1 RETURNING {PRINCIPAL_COLUMNS}");
        let row = sqlx::query_as::<_, PrincipalRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Principal::try_from).transpose()
    }

    async fn list_by_roles(&self, roles: &[Role]) -> StoreResult<Vec<PrincipalSummary>> {
        let roles: Vec<&str> = roles.iter().map(Role::as_str).collect();
        let rows = sqlx::query_as::<_, SummaryRow>(
            "SELECT id, name, email, role, created_at FROM principals \
             WHERE role = ANY($1) ORDER BY created_at, id",
        )
        .bind(&roles)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(PrincipalSummary::try_from).collect()
    }

    async fn search_by_name(
        &self,
        roles: &[Role],
        fragment: &str,
    ) -> StoreResult<Vec<PrincipalSummary>> {
        let roles: Vec<&str> = roles.iter().map(Role::as_str).collect();
        let rows = sqlx::query_as::<_, SummaryRow>(
            "SELECT id, name, email, role, created_at FROM principals \
             WHERE role = ANY($1) AND strpos(lower(name), lower($2)) > 0 \
             ORDER BY created_at, id",
        )
        .bind(&roles)
        .bind(fragment)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(PrincipalSummary::try_from).collect()
    }

    async fn count_by_role(&self, role: Role) -> StoreResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM principals WHERE role = $1")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_ids_never_reach_the_database() {
        assert!(parse_id("not-a-uuid").is_none());
        assert!(parse_id(&Uuid::nil().to_string()).is_some());
    }

    #[test]
    fn partial_reset_ticket_is_corrupt() {
        let now = Utc::now();
        let row = PrincipalRow {
            id: Uuid::nil(),
            name: None,
            email: "a@x.com".into(),
            password_hash: "h".into(),
            role: "admin".into(),
            reset_code: Some("abc".into()),
            reset_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(Principal::try_from(row), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn unknown_role_is_corrupt() {
        let now = Utc::now();
        let row = PrincipalRow {
            id: Uuid::nil(),
            name: None,
            email: "a@x.com".into(),
            password_hash: "h".into(),
            role: "nurse".into(),
            reset_code: None,
            reset_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(Principal::try_from(row), Err(StoreError::Corrupt(_))));
    }
}
