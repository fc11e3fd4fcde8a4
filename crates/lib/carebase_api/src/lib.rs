//! # carebase_api
//!
//! HTTP API library for Carebase.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::middleware::{from_fn_with_state, map_request};
use axum::routing::{MethodRouter, delete, get, patch, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use carebase_core::auth::jwt::TokenService;
use carebase_core::mail::Mailer;
use carebase_core::store::CredentialStore;

use crate::config::ApiConfig;
use crate::handlers::{admins, auth, doctors, patients};
use crate::middleware::capability::{self, Capability, require_capability};
use crate::middleware::rate_limit::{RateLimiter, rate_limit};
use crate::middleware::security_headers;
use crate::services::cookies::SessionTransport;

/// Maximum accepted request body.
pub const BODY_LIMIT_BYTES: usize = 10 * 1024;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub mailer: Arc<dyn Mailer>,
    /// API configuration.
    pub config: ApiConfig,
    pub tokens: TokenService,
    pub cookies: SessionTransport,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Build the token service, session transport and rate limiter from `config`.
    pub fn new(config: ApiConfig, store: Arc<dyn CredentialStore>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            tokens: TokenService::new(config.jwt_secret.as_bytes()),
            cookies: SessionTransport::new(config.secure_cookies()),
            limiter: Arc::new(RateLimiter::new(config.rate_limit)),
            store,
            mailer,
            config,
        }
    }
}

fn requires(capability: Capability, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(capability, require_capability))
}

fn cors_layer(origin: &str) -> Option<CorsLayer> {
    match HeaderValue::from_str(origin) {
        Ok(origin) => Some(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_credentials(true)
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE]),
        ),
        Err(e) => {
            warn!(origin, error = %e, "ignoring invalid CORS origin");
            None
        }
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    // Public routes (no session required)
    let public = Router::new()
        .route(routes::ADMINS_LOGIN, post(auth::login_admin))
        .route(routes::DOCTORS_LOGIN, post(auth::login_doctor))
        .route(routes::PATIENTS_LOGIN, post(auth::login_patient))
        .route(routes::PATIENTS_REGISTER, post(patients::register_patient))
        .route(routes::LOGOUT, delete(auth::logout))
        .route(routes::FORGET_PASSWORD, patch(auth::forget_password))
        .route(routes::RESET_PASSWORD, patch(auth::reset_password));

    // Protected routes: session first, then the route's capability
    let protected = Router::new()
        .route(routes::ME, requires(capability::ANY_PRINCIPAL, get(auth::me)))
        .route(
            routes::ADMINS,
            requires(capability::LIST_ADMINS, get(admins::list_admins))
                .merge(requires(capability::MANAGE_ADMINS, post(admins::create_admin))),
        )
        .route(
            routes::ADMINS_ME,
            requires(capability::UPDATE_OWN_ADMIN, patch(admins::update_own_admin)),
        )
        .route(
            routes::ADMINS_ID,
            requires(
                capability::MANAGE_ADMINS,
                patch(admins::update_admin).delete(admins::delete_admin),
            ),
        )
        .route(
            routes::DOCTORS,
            requires(
                capability::MANAGE_DOCTORS,
                get(doctors::list_doctors).post(doctors::create_doctor),
            ),
        )
        .route(
            routes::DOCTORS_ME,
            requires(capability::UPDATE_OWN_DOCTOR, patch(doctors::update_own_doctor)),
        )
        .route(
            routes::DOCTORS_ID,
            requires(
                capability::MANAGE_DOCTORS,
                get(doctors::get_doctor)
                    .patch(doctors::update_doctor)
                    .delete(doctors::delete_doctor),
            ),
        )
        .route(
            routes::PATIENTS,
            requires(capability::LIST_PATIENTS, get(patients::list_patients)),
        )
        .route(
            routes::PATIENTS_ME,
            requires(capability::UPDATE_OWN_PATIENT, patch(patients::update_own_patient)),
        )
        .route(
            routes::PATIENTS_SEARCH,
            requires(capability::LIST_PATIENTS, get(patients::search_patients)),
        )
        .route(
            routes::PATIENTS_ID,
            requires(capability::LIST_PATIENTS, get(patients::get_patient))
                .merge(requires(capability::MANAGE_PATIENTS, delete(patients::delete_patient))),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    let cors = state.config.allowed_origin.as_deref().and_then(cors_layer);
    let expose_detail = state.config.expose_error_detail();
    let https = state.config.secure_cookies();

    let app = Router::new()
        .merge(public)
        .merge(protected)
        .fallback(error::not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(map_request(reject_oversized))
        .layer(from_fn_with_state(state.limiter.clone(), rate_limit))
        .layer(from_fn_with_state(expose_detail, error::error_boundary))
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    let app = security_headers::apply(app, https);

    match cors {
        Some(cors) => app.layer(cors),
        None => app,
    }
}

/// Bodies announcing more than [`BODY_LIMIT_BYTES`] are refused before any handler runs.
async fn reject_oversized(
    request: axum::extract::Request,
) -> Result<axum::extract::Request, error::AppError> {
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    match declared {
        Some(len) if len > BODY_LIMIT_BYTES => Err(error::AppError::Validation(format!(
            "Request body exceeds {BODY_LIMIT_BYTES} bytes"
        ))),
        _ => Ok(request),
    }
}
