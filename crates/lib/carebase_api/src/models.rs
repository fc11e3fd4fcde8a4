//! Request and response bodies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use carebase_core::models::PrincipalSummary;

use crate::error::AppError;

/// Login body: exactly `email` and `password`.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl TryFrom<Map<String, Value>> for LoginRequest {
    type Error = AppError;

    /// Any other set of keys is rejected rather than ignored.
    fn try_from(body: Map<String, Value>) -> Result<Self, Self::Error> {
        let shape_error =
            || AppError::Validation("Request body must only contain 'email' and 'password'".into());
        if body.len() != 2 {
            return Err(shape_error());
        }
        let field = |key: &str| match body.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(shape_error()),
        };
        Ok(Self {
            email: field("email")?,
            password: field("password")?,
        })
    }
}

/// Registration / creation body. Keys outside this struct are dropped.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrincipalRequest {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    pub confirm_password: Option<String>,
}

/// Partial update body. Keys outside this struct are dropped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePrincipalRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgetPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub password: String,
    pub confirm_password: Option<String>,
}

/// Query string of the patient name search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameSearchQuery {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub status: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PrincipalResponse {
    pub status: bool,
    pub principal: PrincipalSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrincipalListResponse {
    pub status: bool,
    pub principals: Vec<PrincipalSummary>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn login_accepts_exact_shape() {
        let req = LoginRequest::try_from(map(json!({"email": "a@x.com", "password": "p"}))).unwrap();
        assert_eq!(req.email, "a@x.com");
        assert_eq!(req.password, "p");
    }

    #[test]
    fn login_rejects_extra_missing_or_mistyped_fields() {
        for body in [
            json!({"email": "a@x.com", "password": "p", "role": "root"}),
            json!({"email": "a@x.com"}),
            json!({"email": "a@x.com", "pass": "p"}),
            json!({"email": "a@x.com", "password": 12345678}),
            json!({}),
        ] {
            assert!(LoginRequest::try_from(map(body)).is_err());
        }
    }

    #[test]
    fn create_request_drops_unknown_keys() {
        let req: CreatePrincipalRequest = serde_json::from_value(json!({
            "email": "a@x.com",
            "password": "longpass1",
            "confirmPassword": "longpass1",
            "role": "root",
        }))
        .unwrap();
        assert_eq!(req.confirm_password.as_deref(), Some("longpass1"));
        assert!(req.name.is_none());
    }
}
