//! Shared helpers for end-to-end integration tests.
//!
//! These tests run against a real PostgreSQL instance. Configure it via
//! `config/test.toml` or `TICKETHUB__DATABASE__URL` and run with
//! `cargo test -- --ignored`.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use tickethub_core::config::AppConfig;

/// A response captured from the in-process router.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// The `data` payload of a success envelope.
    pub fn data(&self) -> &Value {
        self.body
            .get("data")
            .unwrap_or_else(|| panic!("no data in response: {}", self.body))
    }

    /// Extract a UUID field from the `data` payload.
    pub fn data_id(&self, field: &str) -> Uuid {
        self.data()
            .get(field)
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| panic!("no uuid field '{field}' in response: {}", self.body))
    }
}

/// Test application context: an in-process router plus a database handle.
pub struct TestApp {
    pub router: Router,
    pub db_pool: PgPool,
}

impl TestApp {
    pub async fn new() -> Self {
        let config = AppConfig::load("test").expect("failed to load test config");

        let database = tickethub_database::connection::DatabasePool::connect(&config.database)
            .await
            .expect("failed to connect to test database");
        let db_pool = database.pool().clone();

        tickethub_database::migration::run_migrations(&db_pool)
            .await
            .expect("failed to run migrations");

        Self::clean_database(&db_pool).await;

        let state = tickethub_api::build_state(config, db_pool.clone());
        let router = tickethub_api::build_app(state);

        Self { router, db_pool }
    }

    /// Delete all rows in dependency order so each test starts clean.
    async fn clean_database(pool: &PgPool) {
        let tables = [
            "tickets",
            "event_sessions",
            "events",
            "organization_members",
            "organizations",
            "users",
        ];
        for table in &tables {
            let query = format!("DELETE FROM {table}");
            let _ = sqlx::query(&query).execute(pool).await;
        }
    }

    /// Make an HTTP request to the in-process router.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let body = match body {
            Some(v) => Body::from(serde_json::to_vec(&v).expect("serialize body")),
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    /// Register a staff account and return its bearer token.
    pub async fn register(&self, name: &str, email: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/register",
                Some(serde_json::json!({
                    "name": name,
                    "email": email,
                    "password": "password123",
                })),
                None,
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "register failed: {}",
            response.body
        );
        response
            .data()
            .get("token")
            .and_then(|v| v.as_str())
            .expect("no token in register response")
            .to_string()
    }

    /// Create an organization owned by the token's user.
    pub async fn create_organization(&self, token: &str, name: &str) -> Uuid {
        let response = self
            .request(
                "POST",
                "/api/organizations",
                Some(serde_json::json!({ "name": name })),
                Some(token),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "create organization failed: {}",
            response.body
        );
        response.data_id("id")
    }

    /// Create an event under the organization.
    pub async fn create_event(&self, token: &str, organization_id: Uuid, name: &str) -> Uuid {
        let response = self
            .request(
                "POST",
                &format!("/api/organizations/{organization_id}/events"),
                Some(serde_json::json!({
                    "name": name,
                    "description": "integration test event",
                    "tags": ["test"],
                })),
                Some(token),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "create event failed: {}",
            response.body
        );
        response.data_id("id")
    }

    /// Create a session for the event with the given capacity.
    pub async fn create_session(&self, token: &str, event_id: Uuid, capacity: i32) -> Uuid {
        let response = self
            .request(
                "POST",
                &format!("/api/events/{event_id}/sessions"),
                Some(serde_json::json!({
                    "name": "Day 1",
                    "starts_at": "2026-10-01T10:00:00Z",
                    "location": "Hall A",
                    "capacity": capacity,
                })),
                Some(token),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "create session failed: {}",
            response.body
        );
        response.data_id("id")
    }

    /// Issue tickets through the public application endpoint.
    pub async fn issue(&self, body: Value) -> TestResponse {
        self.request("POST", "/api/tickets", Some(body), None).await
    }
}
