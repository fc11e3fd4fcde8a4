//! Domain models.

pub mod auth;

pub use auth::{
    NewPrincipal, Principal, PrincipalPatch, PrincipalSummary, ResetTicket, ResetUpdate, Role,
    SessionClaims,
};
