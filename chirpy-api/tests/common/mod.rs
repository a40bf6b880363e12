/// Common test utilities for API tests
///
/// Every context gets its own in-memory stores, hit counter and static file
/// directory, so tests run in parallel without a database.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chirpy_api::{
    app::{build_router, AppState},
    config::Config,
};
use serde_json::Value;
use std::path::PathBuf;
use tower::Service as _;
use uuid::Uuid;

pub const JWT_SECRET: &str = "api-test-secret-key-at-least-32-bytes";
pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

/// Test context containing the router and its state
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
    pub static_dir: PathBuf,
}

/// Response status plus parsed JSON body (`Null` when empty or not JSON)
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestContext {
    /// Dev platform with a webhook key configured
    pub fn new() -> Self {
        Self::with_platform("dev")
    }

    pub fn with_platform(platform: &str) -> Self {
        let static_dir = std::env::temp_dir().join(format!("chirpy-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&static_dir).unwrap();
        std::fs::write(static_dir.join("index.html"), "<h1>Welcome to Chirpy</h1>").unwrap();

        let root = static_dir.to_string_lossy().to_string();
        let platform = platform.to_string();
        let config = Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some(JWT_SECRET.to_string()),
            "PLATFORM" => Some(platform.clone()),
            "POLKA_KEY" => Some(POLKA_KEY.to_string()),
            "FILEPATH_ROOT" => Some(root.clone()),
            _ => None,
        })
        .unwrap();

        let state = AppState::in_memory(config);
        let app = build_router(state.clone());

        Self {
            app,
            state,
            static_dir,
        }
    }

    /// Sends a request with optional `Authorization` value and JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&bytes).to_string();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body, text }
    }

    /// Registers a user and returns its JSON profile
    pub async fn register(&self, email: &str, password: &str) -> Value {
        let res = self
            .send(
                Method::POST,
                "/api/users",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "register failed: {}", res.text);
        res.body
    }

    /// Logs in and returns the full login response
    pub async fn login(&self, email: &str, password: &str) -> Value {
        let res = self
            .send(
                Method::POST,
                "/api/login",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.text);
        res.body
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.static_dir);
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Extracts a string field from a JSON body
pub fn field<'a>(body: &'a Value, name: &str) -> &'a str {
    body[name]
        .as_str()
        .unwrap_or_else(|| panic!("missing string field '{}' in {}", name, body))
}
