//! Shared test helpers for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use khozo_api::{AppState, build_app};
use khozo_auth::JwtEncoder;
use khozo_cache::CacheManager;
use khozo_cache::memory::MemoryCacheProvider;
use khozo_core::config::AppConfig;
use khozo_core::traits::FixedClock;
use khozo_database::{MemoryStore, Stores};
use khozo_push::LogPushGateway;

/// Key accepted on internal endpoints.
pub const SERVICE_KEY: &str = "test-service-key";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Clock shared by every service
    pub clock: Arc<FixedClock>,
    /// Application state, for direct store access
    pub state: AppState,
    encoder: JwtEncoder,
}

impl TestApp {
    /// Application over a fresh memory store, clock at 2025-11-01T00:00Z.
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.database.provider = "memory".to_string();
        config.auth.jwt_secret = "integration-test-secret".to_string();
        config.auth.service_key = SERVICE_KEY.to_string();

        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap(),
        ));
        let stores = Stores::memory(Arc::new(MemoryStore::new()));
        let cache = CacheManager::from_provider(Arc::new(MemoryCacheProvider::new(1_000)));
        let encoder = JwtEncoder::new(&config.auth);

        let state = AppState::build(
            config,
            stores,
            cache,
            Arc::new(LogPushGateway),
            clock.clone(),
        )
        .expect("Failed to build state");

        Self {
            router: build_app(state.clone()),
            clock,
            state,
            encoder,
        }
    }

    /// Access token for a brand new user.
    pub fn new_user(&self) -> String {
        self.token_for(Uuid::new_v4())
    }

    /// Access token for `user_id`.
    pub fn token_for(&self, user_id: Uuid) -> String {
        self.encoder.issue(user_id).expect("Failed to issue token")
    }

    /// Track an opportunity and return its JSON.
    pub async fn create_opportunity(&self, token: &str, body: Value) -> Value {
        let response = self
            .request("POST", "/api/opportunities", Some(body), Some(token))
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Create failed: {:?}",
            response.body
        );
        response.body["data"].clone()
    }

    /// Track a minimal exam application titled `title`.
    pub async fn create_simple(&self, token: &str, title: &str) -> Value {
        self.create_opportunity(
            token,
            json!({ "title": title, "category": "exam", "type": "application" }),
        )
        .await
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut headers = Vec::new();
        if let Some(token) = token {
            headers.push(("Authorization", format!("Bearer {token}")));
        }
        self.request_with_headers(method, path, body, &headers).await
    }

    /// Make an HTTP request with arbitrary extra headers.
    pub async fn request_with_headers(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, String)],
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        for (name, value) in headers {
            req = req.header(*name, value);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
