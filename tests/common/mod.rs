#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use daykeep::config::AppConfig;
use daykeep::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_config() -> AppConfig {
    AppConfig {
        port: 0,
        jwt_secret: TEST_SECRET.to_string(),
        token_ttl_hours: 24,
        reset_ttl_minutes: 15,
        reset_url_base: "http://localhost:5173/reset-password".to_string(),
        expose_reset_url: true,
        open_habit_routes: true,
    }
}

pub async fn test_state_with(config: AppConfig) -> AppState {
    // A single connection keeps every query on the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations failed");
    AppState::new(pool, config)
}

pub async fn test_app() -> (Router, AppState) {
    let state = test_state_with(test_config()).await;
    (daykeep::router(state.clone()), state)
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .expect("failed to build request"),
        None => builder.body(Body::empty()).expect("failed to build request"),
    };

    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response was not JSON")
    };
    (status, value)
}

pub async fn register(app: &Router, id: &str) {
    let (status, _) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "id": id,
            "email": format!("{id}@example.com"),
            "password": "password123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

pub async fn login(app: &Router, id: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "id": id, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().expect("token missing").to_string()
}

pub async fn register_and_login(app: &Router, id: &str) -> String {
    register(app, id).await;
    login(app, id).await
}

/// Registers an admin account. Promotion happens before login so the token
/// carries the admin role.
pub async fn register_admin(app: &Router, state: &AppState, id: &str) -> String {
    register(app, id).await;
    sqlx::query("UPDATE users SET is_admin = 1 WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await
        .expect("failed to promote user");
    login(app, id).await
}
