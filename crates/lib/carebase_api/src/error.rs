//! Application error types and the error-formatting boundary.

use axum::{
    Json,
    extract::{
        Request, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use carebase_core::auth::AuthError;
use carebase_core::mail::MailError;
use carebase_core::store::StoreError;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid or expired: {0}")]
    InvalidOrExpired(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Too many requests")]
    TooManyRequests,

    #[error("Mail delivery failed: {0}")]
    MailDelivery(String),

    #[error("Internal server error")]
    Internal(String),
}

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Bodies of bare error responses are read up to this size.
const BARE_BODY_LIMIT: usize = 4 * 1024;

/// Error rendered by [`AppError::into_response`], kept on the response so the
/// boundary can re-render it with the configured detail policy.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    status: StatusCode,
    body: ErrorBody,
}

impl ErrorReport {
    fn render(mut self, expose_detail: bool) -> Response {
        if !expose_detail {
            self.body.detail = None;
        }
        (self.status, Json(self.body)).into_response()
    }
}

impl AppError {
    fn report(&self) -> ErrorReport {
        let (status, error, message, detail) = match self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.clone(), None),
            AppError::Unauthenticated(m) => (StatusCode::FORBIDDEN, "unauthenticated", m.clone(), None),
            AppError::Forbidden(m) => (StatusCode::FORBIDDEN, "forbidden", m.clone(), None),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.clone(), None),
            AppError::Conflict(m) => (StatusCode::CONFLICT, "conflict", m.clone(), None),
            AppError::InvalidOrExpired(m) => {
                (StatusCode::BAD_REQUEST, "invalid_or_expired", m.clone(), None)
            }
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "method_not_allowed",
                "Method not allowed".to_string(),
                None,
            ),
            AppError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests, please try again later".to_string(),
                None,
            ),
            AppError::MailDelivery(d) => (
                StatusCode::BAD_GATEWAY,
                "mail_delivery_failed",
                "The email could not be sent, please try again later".to_string(),
                Some(d.clone()),
            ),
            AppError::Internal(d) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
                Some(d.clone()),
            ),
        };
        ErrorReport {
            status,
            body: ErrorBody {
                status: status.as_u16(),
                error,
                message,
                detail,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(detail) = &self {
            tracing::error!(%detail, "internal error");
        }
        let report = self.report();
        let mut response = report.clone().render(false);
        response.extensions_mut().insert(report);
        response
    }
}

/// Router-level boundary: renders every [`ErrorReport`] uniformly, attaching
/// `detail` only when the configuration allows it.
///
/// Error responses produced by axum itself (405, extractor rejections) carry
/// no report; they are translated and rendered the same way.
pub async fn error_boundary(
    State(expose_detail): State<bool>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    if let Some(report) = response.extensions_mut().remove::<ErrorReport>() {
        return report.render(expose_detail);
    }
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let text = axum::body::to_bytes(response.into_body(), BARE_BODY_LIMIT)
        .await
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_default();
    let mut rendered = AppError::from_bare(status, text)
        .report()
        .render(expose_detail);
    if let Some(allow) = allow {
        rendered.headers_mut().insert(header::ALLOW, allow);
    }
    rendered
}

impl AppError {
    /// Classify an error response that did not come from an [`AppError`].
    fn from_bare(status: StatusCode, text: String) -> Self {
        match status {
            StatusCode::METHOD_NOT_ALLOWED => AppError::MethodNotAllowed,
            StatusCode::NOT_FOUND => AppError::NotFound("URL path not found".into()),
            StatusCode::TOO_MANY_REQUESTS => AppError::TooManyRequests,
            s if s.is_server_error() => AppError::Internal(text),
            s if text.is_empty() => {
                AppError::Validation(s.canonical_reason().unwrap_or("Bad request").to_string())
            }
            _ => AppError::Validation(text),
        }
    }
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("URL path not found".into())
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::CredentialError => AppError::Validation("Invalid email or password".into()),
            AuthError::TokenError(msg) => AppError::Internal(msg),
            AuthError::ValidationError(msg) => AppError::Validation(msg),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(email) => {
                AppError::Conflict(format!("Email already exists: {email}"))
            }
            StoreError::Db(e) => AppError::Internal(e.to_string()),
            StoreError::Corrupt(msg) => AppError::Internal(msg),
        }
    }
}

impl From<MailError> for AppError {
    fn from(e: MailError) -> Self {
        AppError::MailDelivery(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn statuses_follow_variants() {
        let cases = [
            (AppError::Validation("v".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthenticated("u".into()), StatusCode::FORBIDDEN),
            (AppError::Forbidden("f".into()), StatusCode::FORBIDDEN),
            (AppError::NotFound("n".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("c".into()), StatusCode::CONFLICT),
            (AppError::InvalidOrExpired("i".into()), StatusCode::BAD_REQUEST),
            (AppError::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED),
            (AppError::TooManyRequests, StatusCode::TOO_MANY_REQUESTS),
            (AppError::MailDelivery("m".into()), StatusCode::BAD_GATEWAY),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn direct_rendering_never_exposes_detail() {
        let json = body_json(AppError::Internal("db exploded".into()).into_response()).await;
        assert_eq!(json["status"], 500);
        assert_eq!(json["error"], "internal_error");
        assert_eq!(json["message"], "Internal server error");
        assert!(json.get("detail").is_none());
    }

    #[tokio::test]
    async fn report_render_respects_detail_policy() {
        let report = AppError::Internal("db exploded".into()).report();
        let shown = body_json(report.clone().render(true)).await;
        assert_eq!(shown["detail"], "db exploded");
        let hidden = body_json(report.render(false)).await;
        assert!(hidden.get("detail").is_none());
    }

    #[test]
    fn bare_statuses_are_classified() {
        assert!(matches!(
            AppError::from_bare(StatusCode::METHOD_NOT_ALLOWED, String::new()),
            AppError::MethodNotAllowed
        ));
        assert!(matches!(
            AppError::from_bare(StatusCode::UNSUPPORTED_MEDIA_TYPE, "Expected JSON".into()),
            AppError::Validation(m) if m == "Expected JSON"
        ));
        assert!(matches!(
            AppError::from_bare(StatusCode::PAYLOAD_TOO_LARGE, String::new()),
            AppError::Validation(m) if m == "Payload Too Large"
        ));
        assert!(matches!(
            AppError::from_bare(StatusCode::BAD_GATEWAY, "upstream".into()),
            AppError::Internal(d) if d == "upstream"
        ));
    }

    #[test]
    fn conflict_maps_from_store() {
        let e: AppError = StoreError::Conflict("a@x.com".into()).into();
        assert!(matches!(e, AppError::Conflict(m) if m.contains("a@x.com")));
    }
}
