/// Common test utilities for integration tests
///
/// Builds the full router over an in-memory store and drives it in-process
/// through `tower::Service`, so no database or socket is needed.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::store::memory::MemoryStore;
use tower::Service as _;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a new test context with an empty store
    pub fn new() -> Self {
        let config = Config::from_lookup(|key| match key {
            "STORE_BACKEND" => Some("memory".to_string()),
            "JWT_SECRET" => Some(TEST_SECRET.to_string()),
            _ => None,
        })
        .expect("Test configuration should be valid");

        let store = Arc::new(MemoryStore::new());
        let app = build_router(AppState::new(store.clone(), config.clone()));

        TestContext { store, app, config }
    }

    /// Sends a request and returns the status with the parsed JSON body
    ///
    /// An empty body comes back as `Value::Null`.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.send_raw(builder.body(body).unwrap()).await
    }

    /// Sends a prebuilt request
    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("Non-JSON body: {}", String::from_utf8_lossy(&bytes))
            })
        };

        (status, value)
    }

    /// Registers a user and returns its access token
    pub async fn register(&self, name: &str, email: &str, password: &str) -> String {
        self.register_with_role(name, email, password, None).await
    }

    /// Registers a user with an explicit role and returns its access token
    pub async fn register_with_role(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> String {
        let mut body = json!({ "name": name, "email": email, "password": password });
        if let Some(role) = role {
            body["role"] = json!(role);
        }

        let (status, value) = self.send("POST", "/auth/register", None, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", value);

        value["access_token"]
            .as_str()
            .expect("access_token missing")
            .to_string()
    }

    /// Bulk-creates tasks from titles and returns the created tasks
    pub async fn create_tasks(&self, token: &str, titles: &[&str]) -> Vec<Value> {
        let tasks: Vec<Value> = titles.iter().map(|t| json!({ "title": t })).collect();

        let (status, value) = self
            .send("POST", "/tasks/bulk", Some(token), Some(json!({ "tasks": tasks })))
            .await;
        assert_eq!(status, StatusCode::CREATED, "bulk create failed: {}", value);

        value["data"].as_array().cloned().expect("data missing")
    }
}
