//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;

use changelog_service::api::{build_router, AppState};
use changelog_service::clock::FixedClock;
use changelog_service::store::StorageBackend;
use changelog_service::Settings;

/// 2023-01-15T00:00:00Z
pub const JAN_15_2023: i64 = 1_673_740_800;
pub const DAY: i64 = 86_400;

/// In-memory application with a controllable clock
pub struct TestApp {
    pub state: AppState,
    pub clock: FixedClock,
    pub router: Router,
}

pub fn setup_app(now: i64) -> TestApp {
    setup_app_with(now, Settings::default())
}

pub fn setup_app_with(now: i64, settings: Settings) -> TestApp {
    let clock = FixedClock::new(now);
    let state = AppState::new(
        StorageBackend::in_memory(),
        Arc::new(clock.clone()),
        settings,
    );
    let router = build_router(state.clone());
    TestApp {
        state,
        clock,
        router,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, body) = self.send(request).await;
        (status, parse(&body))
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.json_request("POST", uri, body, None).await
    }

    pub async fn post_as(&self, uri: &str, body: Value, user_id: &str) -> (StatusCode, Value) {
        self.json_request("POST", uri, body, Some(user_id)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.json_request("PATCH", uri, body, None).await
    }

    pub async fn delete(&self, uri: &str) -> StatusCode {
        let request = Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await.0
    }

    async fn json_request(
        &self,
        method: &str,
        uri: &str,
        body: Value,
        user_id: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(user_id) = user_id {
            builder = builder.header("X-User-Id", user_id);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        let (status, body) = self.send(request).await;
        (status, parse(&body))
    }
}

/// JSON body, or Null for empty / non-JSON bodies
fn parse(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

/// Fresh PostgreSQL schema, or `None` when DATABASE_URL is not set
pub async fn setup_test_db() -> Option<sqlx::PgPool> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").ok()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    let migration = include_str!("../../migrations/0001_changelog.sql");
    for statement in migration.split(';').filter(|s| !s.trim().is_empty()) {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .expect("Failed to apply migration");
    }

    sqlx::query("TRUNCATE TABLE changelog_events, changelog_releases RESTART IDENTITY")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    Some(pool)
}
