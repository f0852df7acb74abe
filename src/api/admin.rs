use axum::{
    Json,
    extract::{Path, State},
};
use tracing::info;

use crate::auth::AdminUser;
use crate::db::repository;
use crate::error::AppError;
use crate::models::{PublicUser, UpdateUserRequest};
use crate::state::AppState;

use super::MessageResponse;

pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    let users = repository::fetch_users(&state.db).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<PublicUser>, AppError> {
    let user = repository::find_user(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(user.into()))
}

pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>, AppError> {
    if let Some(email) = &req.email {
        if email.trim().is_empty() {
            return Err(AppError::Validation("Email cannot be empty".to_string()));
        }
        if repository::email_taken_by_other(&state.db, &id, email).await? {
            return Err(AppError::DuplicateIdentity);
        }
    }

    let user = repository::update_user(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    info!("admin {} updated user {}", admin.sub, user.id);
    Ok(Json(user.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if repository::delete_user(&state.db, &id).await? {
        info!("admin {} deleted user {}", admin.sub, id);
        Ok(MessageResponse::new("User deleted"))
    } else {
        Err(AppError::NotFound)
    }
}
