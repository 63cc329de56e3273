//! Integration tests for Harbormaster.
//!
//! The full router, middleware included, is driven in-process with
//! `tower::ServiceExt::oneshot` against [`MemoryStore`] and the in-memory
//! session store, so no database or running server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p harbormaster-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use harbormaster_api::config::{ApiConfig, AuthMode};
use harbormaster_api::db::MemoryStore;
use harbormaster_api::middleware::create_session_layer;
use harbormaster_api::routes;
use harbormaster_api::state::AppState;

/// Largest response body the helpers will buffer.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Configuration for tests. The database URL is never dialled.
#[must_use]
pub fn test_config(auth_mode: AuthMode) -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from("postgres://unused@localhost/harbormaster"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        token_secret: SecretString::from("kR8#vM2$qW5!zN9@tL4&hX7*bP1^dF6"),
        token_ttl_days: 30,
        auth_mode,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON body, `Value::Null` when the body is not JSON.
    pub json: Value,
    pub text: String,
}

impl TestResponse {
    /// The `data` member of the envelope.
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.json["data"]
    }

    /// The `message` member of the envelope, or `""`.
    #[must_use]
    pub fn message(&self) -> &str {
        self.json["message"].as_str().unwrap_or_default()
    }

    /// `name=value` of the session cookie set by this response, if any.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("hm_session="))
            .and_then(|v| v.split(';').next())
            .map(String::from)
    }

    /// The `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// The application wired to fresh in-memory stores.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Bearer-token API.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mode(AuthMode::Token)
    }

    /// Cookie sessions and browser pages.
    #[must_use]
    pub fn with_sessions() -> Self {
        Self::with_mode(AuthMode::Session)
    }

    #[must_use]
    pub fn with_mode(auth_mode: AuthMode) -> Self {
        let config = test_config(auth_mode);
        let sessions = create_session_layer(tower_sessions::MemoryStore::default(), &config);
        let state = AppState::new(config, Arc::new(MemoryStore::new()));
        Self {
            router: routes::app(state.clone(), sessions),
            state,
        }
    }

    /// Send a raw request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let json = serde_json::from_str(&text).unwrap_or(Value::Null);
        TestResponse {
            status,
            headers,
            json,
            text,
        }
    }

    /// Send a JSON request, optionally authenticated by bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        };
        self.send(request.unwrap()).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Register `email` with a fixed password, log in, and return the token.
    pub async fn login_as(&self, email: &str) -> String {
        let registered = self
            .post(
                "/api/users",
                None,
                serde_json::json!({
                    "username": "harbourmaster",
                    "email": email,
                    "password": "s3cure-pass",
                }),
            )
            .await;
        assert_eq!(registered.status, StatusCode::CREATED, "{}", registered.text);

        let login = self
            .post(
                "/login",
                None,
                serde_json::json!({ "email": email, "password": "s3cure-pass" }),
            )
            .await;
        assert_eq!(login.status, StatusCode::OK, "{}", login.text);
        login.data()["token"].as_str().unwrap().to_string()
    }

    /// Create a berth through the API.
    pub async fn create_catway(&self, token: &str, number: i64) -> TestResponse {
        self.post(
            "/api/catways",
            Some(token),
            serde_json::json!({
                "catwayNumber": number,
                "catwayType": "long",
                "catwayState": "good",
            }),
        )
        .await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
