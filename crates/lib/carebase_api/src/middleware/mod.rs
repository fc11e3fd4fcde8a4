//! Request middleware.

pub mod auth;
pub mod capability;
pub mod rate_limit;
pub mod security_headers;
