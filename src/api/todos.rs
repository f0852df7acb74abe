use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::auth::AuthUser;
use crate::db::repository;
use crate::error::AppError;
use crate::models::{NewTodoRequest, Todo, UpdateTodoRequest};
use crate::state::AppState;

use super::MessageResponse;

pub async fn list(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<Todo>>, AppError> {
    let todos = repository::fetch_todos(&state.db, &claims.sub).await?;
    Ok(Json(todos))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<NewTodoRequest>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }

    let todo = repository::insert_todo(&state.db, &claims.sub, req).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn get_one(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Todo>, AppError> {
    let todo = repository::find_todo(&state.db, &id, &claims.sub)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(todo))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateTodoRequest>,
) -> Result<Json<Todo>, AppError> {
    if let Some(title) = &req.title {
        if title.trim().is_empty() {
            return Err(AppError::Validation("Title cannot be empty".to_string()));
        }
    }

    let todo = repository::update_todo(&state.db, &id, &claims.sub, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(todo))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if repository::delete_todo(&state.db, &id, &claims.sub).await? {
        Ok(MessageResponse::new("Todo deleted"))
    } else {
        Err(AppError::NotFound)
    }
}
