//! Shared harness: full router over the in-memory store and a recording mailer.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use carebase_api::config::{ApiConfig, Environment, RateLimit};
use carebase_api::{AppState, router};
use carebase_core::auth::password::hash_password;
use carebase_core::mail::{MailError, Mailer};
use carebase_core::models::{NewPrincipal, Principal, Role};
use carebase_core::store::{CredentialStore, MemoryCredentialStore};

pub const SECRET: &str = "integration-secret";
pub const PASSWORD: &str = "longpass1";

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentMail>>,
    pub fail: bool,
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(
        &self,
        to_address: &str,
        _to_name: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Transport("smtp unreachable".into()));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to_address.into(),
            subject: subject.into(),
            body: html_body.into(),
        });
        Ok(())
    }
}

pub fn config(environment: Environment) -> ApiConfig {
    ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        jwt_secret: SECRET.into(),
        environment,
        reset_url_base: "http://app.test/reset-password".into(),
        hospital_name: "Test General".into(),
        allowed_origin: None,
        // High enough that only the dedicated tests hit it.
        rate_limit: RateLimit {
            max_requests: 10_000,
            window: Duration::from_secs(60),
        },
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: Value,
}

impl TestResponse {
    /// `auth_token=...` pair from `Set-Cookie`, ready to send back.
    pub fn session_cookie(&self) -> Option<String> {
        self.set_cookie()
            .and_then(|c| c.split(';').next().map(str::to_string))
    }

    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryCredentialStore>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(Environment::Development, RecordingMailer::default())
    }

    pub fn with(environment: Environment, mailer: RecordingMailer) -> Self {
        Self::with_config(config(environment), mailer)
    }

    pub fn with_config(config: ApiConfig, mailer: RecordingMailer) -> Self {
        let store = Arc::new(MemoryCredentialStore::new());
        let mailer = Arc::new(mailer);
        let state = AppState::new(config, store.clone(), mailer.clone());
        Self {
            router: router(state),
            store,
            mailer,
        }
    }

    pub async fn seed(&self, email: &str, role: Role) -> Principal {
        self.store
            .create(NewPrincipal {
                name: Some(format!("{role} user")),
                email: email.into(),
                password_hash: hash_password(PASSWORD).unwrap(),
                role,
            })
            .await
            .unwrap()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        self.dispatch(request(method, uri, cookie, body)).await
    }

    /// Like [`TestApp::send`], as if the request arrived from `peer`.
    pub async fn send_from(&self, peer: SocketAddr, method: Method, uri: &str) -> TestResponse {
        let mut request = request(method, uri, None, None);
        request.extensions_mut().insert(ConnectInfo(peer));
        self.dispatch(request).await
    }

    pub async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            headers,
            json,
        }
    }

    /// Log in and return the cookie header value for later requests.
    pub async fn login(&self, login_path: &str, email: &str) -> String {
        let response = self
            .send(
                Method::POST,
                login_path,
                None,
                Some(serde_json::json!({"email": email, "password": PASSWORD})),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.json);
        response.session_cookie().expect("session cookie")
    }
}

pub fn request(method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
