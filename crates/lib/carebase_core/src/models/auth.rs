//! Authentication domain models.
//!
//! These are internal domain models, distinct from the API request and
//! response bodies in `carebase_api` (which carry camelCase renames etc.).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role carried by every principal and embedded in its session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Root,
    Admin,
    Doctor,
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Root => "root",
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Patient => "patient",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "root" => Ok(Role::Root),
            "admin" => Ok(Role::Admin),
            "doctor" => Ok(Role::Doctor),
            "patient" => Ok(Role::Patient),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// One-time password reset code and its expiry.
///
/// Held as a single optional value on [`Principal`] so code and expiry are
/// always present or absent together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetTicket {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Stored principal (admin, doctor or patient) including secrets.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub reset: Option<ResetTicket>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    /// Name used when addressing the principal (greetings, email recipient).
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }

    pub fn summary(&self) -> PrincipalSummary {
        PrincipalSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// Projection of a principal without password hash or reset ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalSummary {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the credential store. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Change to a principal's reset ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetUpdate {
    Issue(ResetTicket),
    Clear,
}

/// Typed partial update. Only the fields declared here can ever be written.
#[derive(Debug, Clone, Default)]
pub struct PrincipalPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub reset: Option<ResetUpdate>,
}

impl PrincipalPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.reset.is_none()
    }

    pub fn issue_reset(ticket: ResetTicket) -> Self {
        Self {
            reset: Some(ResetUpdate::Issue(ticket)),
            ..Self::default()
        }
    }

    pub fn clear_reset() -> Self {
        Self {
            reset: Some(ResetUpdate::Clear),
            ..Self::default()
        }
    }

    /// Apply the patch to an in-memory record.
    pub fn apply(self, principal: &mut Principal, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            principal.name = Some(name);
        }
        if let Some(email) = self.email {
            principal.email = email;
        }
        if let Some(hash) = self.password_hash {
            principal.password_hash = hash;
        }
        match self.reset {
            Some(ResetUpdate::Issue(ticket)) => principal.reset = Some(ticket),
            Some(ResetUpdate::Clear) => principal.reset = None,
            None => {}
        }
        principal.updated_at = now;
    }
}

/// JWT claims embedded in session tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: principal ID (standard JWT `sub` claim).
    pub sub: String,
    /// Principal role at issuance.
    pub role: Role,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}
