//! Business logic between handlers and the credential store.

pub mod auth;
pub mod cookies;
pub mod principals;
