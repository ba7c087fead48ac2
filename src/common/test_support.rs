//! Shared fixtures for async tests: an in-memory database, an app state
//! wired to it, and a recording mailer.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use super::config::{AppConfig, Environment};
use super::migrations::run_migrations;
use super::state::AppState;
use crate::auth::password::hash_password;
use crate::auth::services::insert_user as insert_user_row;
use crate::auth::models::NewUser;
use crate::services::email::{MailError, Mailer, OutgoingMail};

pub const TEST_SECRET: &str = "test_secret_key";

/// One connection, so every query sees the same in-memory database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    run_migrations(&pool, false).await.expect("migrations");
    pool
}

pub fn test_config() -> AppConfig {
    AppConfig {
        environment: Environment::Test,
        database_url: "sqlite::memory:".to_string(),
        database_max_connections: 1,
        port: 0,
        token_secret: TEST_SECRET.to_string(),
        token_expiration_minutes: 20,
        cors_origins: vec!["http://localhost:3000".to_string()],
        cookie_domain: None,
        sendgrid_api_key: None,
        contact_email: "contact@localhost".to_string(),
        bcrypt_cost: bcrypt_min_cost(),
        reset_db: false,
    }
}

pub fn bcrypt_min_cost() -> u32 {
    4
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingMail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        self.sent.lock().expect("mailer lock").push(mail);
        Ok(())
    }
}

pub async fn test_state() -> AppState {
    AppState {
        db: test_pool().await,
        config: Arc::new(test_config()),
        mailer: Arc::new(RecordingMailer::default()),
    }
}

/// Inserts a user with password "password", skipping signup validation.
/// The username is the local part of `email`. Returns the new id.
pub async fn insert_user(pool: &SqlitePool, firstname: &str, email: &str) -> String {
    let user = NewUser {
        firstname: firstname.to_string(),
        lastname: "Tester".to_string(),
        username: email.split('@').next().unwrap_or(email).to_string(),
        email: email.to_string(),
        password_hash: hash_password("password", bcrypt_min_cost()).expect("hash"),
        birthday: None,
    };
    let mut conn = pool.acquire().await.expect("connection");
    insert_user_row(&mut conn, &user).await.expect("insert user")
}

/// Sends one request through the router and returns status, headers and JSON body
/// (`Value::Null` for an empty or non-JSON body).
pub async fn send(
    app: &Router,
    request: Request<Body>,
) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
    let response = app.clone().oneshot(request).await.expect("router response");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, headers, body)
}

pub fn json_request(
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn empty_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

/// Extracts `token=<value>` from a `Set-Cookie` header, ready to send back.
pub fn session_cookie(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("token="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

/// A `token=<jwt>` cookie for `user_id`, valid for a few minutes.
pub fn auth_cookie(user_id: &str) -> String {
    let token = crate::auth::tokens::issue_token(
        user_id,
        crate::auth::tokens::session_expiry(5),
        TEST_SECRET,
    )
    .expect("token");
    format!("token={}", token)
}
