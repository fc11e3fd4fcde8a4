//! Authentication and authorization logic.
//!
//! Provides password hashing, session-token management, reset tickets and
//! credential validation shared by `carebase_api` and the server binary.

pub mod jwt;
pub mod password;
pub mod reset;
pub mod validation;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
