//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::util::ServiceExt;
use uuid::Uuid;

use coin_shop::api::{self, AppState, ShopOptions};
use coin_shop::auth::TokenService;
use coin_shop::domain::{Balance, Catalog};
use coin_shop::db;
use coin_shop::store::InMemoryAccountStore;

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryAccountStore>,
    pub tokens: Arc<TokenService>,
}

impl TestApp {
    /// Seed an account directly and hand back a valid token for it
    pub fn seed(&self, username: &str, coins: i64) -> String {
        self.store
            .insert_account(username, Balance::new(coins).unwrap())
            .expect("username already seeded");
        self.tokens.issue(username).unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, body)
    }
}

/// Router over a fresh in-memory store with the default catalog
pub fn setup_app() -> TestApp {
    let store = Arc::new(InMemoryAccountStore::new());
    let tokens = Arc::new(TokenService::new(TEST_SECRET, chrono::Duration::hours(1)));
    let state = AppState::new(
        store.clone(),
        Arc::new(Catalog::default()),
        tokens.clone(),
        ShopOptions::default(),
    );

    TestApp {
        router: api::create_router(state),
        store,
        tokens,
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Connect to the test database and make sure the schema exists.
///
/// Returns `None` when `DATABASE_URL` is not set so database tests can be
/// skipped on machines without Postgres.
pub async fn setup_test_db() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set, skipping database test");
            return None;
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    db::migrate(&pool).await.expect("Failed to bootstrap schema");

    Some(pool)
}

/// Username unique to this test run, so tests never share rows
pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}
