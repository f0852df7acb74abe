mod admin;
mod auth;
mod habits;
mod todos;

use axum::routing::{get, post, put};
use axum::{Json, Router, extract::State, http::StatusCode};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/verify", get(auth::verify_session))
        .route("/auth/reset-password/request", post(auth::request_reset))
        .route("/auth/reset-password", post(auth::confirm_reset))
        .route("/todos", get(todos::list).post(todos::create))
        .route(
            "/todos/{id}",
            get(todos::get_one)
                .put(todos::update)
                .patch(todos::update)
                .delete(todos::delete),
        )
        .route("/admin/users", get(admin::list_users))
        .route(
            "/admin/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
        .route("/groups", get(habits::list_groups).post(habits::create_group))
        .route(
            "/groups/{id}",
            get(habits::get_group).delete(habits::delete_group),
        )
        .route("/groups/{id}/habits", post(habits::add_habit))
        .route("/groups/{id}/start", post(habits::start_execution))
        .route("/groups/{id}/complete-current", post(habits::complete_current))
        .route("/groups/{id}/skip-current", post(habits::skip_current))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}
