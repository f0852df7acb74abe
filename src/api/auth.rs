use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use tracing::{info, warn};

use crate::auth::{self, AuthUser};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{
    LoginRequest, LoginResponse, PublicUser, RegisterRequest, ResetConfirmRequest, ResetRequest,
    ResetRequestResponse,
};
use crate::state::AppState;

use super::MessageResponse;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    if req.id.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "User ID, email and password are required".to_string(),
        ));
    }
    if repository::identity_taken(&state.db, &req.id, &req.email).await? {
        warn!("registration attempt with existing id or email: {}", req.id);
        return Err(AppError::DuplicateIdentity);
    }

    let hash = auth::hash_password(req.password).await?;
    let user = repository::insert_user(&state.db, &req.id, &req.email, &hash).await?;
    info!("registered user {}", user.id);

    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = match repository::find_user(&state.db, &req.id).await? {
        Some(user) => user,
        None => {
            // Hash anyway so the unknown-user path costs as much as a
            // mismatch; the error never says which one it was.
            auth::hash_password(req.password).await?;
            return Err(AppError::InvalidCredentials);
        }
    };

    if !auth::verify_password(req.password, user.password_hash.clone()).await? {
        return Err(AppError::InvalidCredentials);
    }

    let token = auth::issue_token(&user.id, user.is_admin, &state.config)?;
    info!("user {} logged in", user.id);

    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

/// Session check for the client: echoes the identity a valid token resolves to.
pub async fn verify_session(AuthUser(claims): AuthUser) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "user": claims.sub }))
}

pub async fn request_reset(
    State(state): State<AppState>,
    Json(req): Json<ResetRequest>,
) -> Result<Json<ResetRequestResponse>, AppError> {
    let user = repository::find_user(&state.db, &req.id)
        .await?
        .ok_or(AppError::UnknownIdentity)?;

    let expires_at = (Utc::now() + chrono::Duration::minutes(state.config.reset_ttl_minutes))
        .to_rfc3339();
    let token = repository::insert_reset(&state.db, &user.id, &expires_at).await?;
    let reset_url = format!("{}?token={}", state.config.reset_url_base, token);
    info!("password reset requested for {}", user.id);

    // Email delivery is stubbed; in dev mode the URL rides back in the
    // response so the flow can be exercised end to end.
    Ok(Json(ResetRequestResponse {
        message: "A password reset link has been issued".to_string(),
        reset_url: state.config.expose_reset_url.then_some(reset_url),
    }))
}

pub async fn confirm_reset(
    State(state): State<AppState>,
    Json(req): Json<ResetConfirmRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if req.new_password.is_empty() {
        return Err(AppError::Validation("New password is required".to_string()));
    }

    let reset = repository::find_reset(&state.db, &req.token)
        .await?
        .ok_or(AppError::InvalidReset)?;
    let expired = chrono::DateTime::parse_from_rfc3339(&reset.expires_at)
        .map(|t| t < Utc::now())
        .unwrap_or(true);
    if reset.used || expired {
        return Err(AppError::InvalidReset);
    }

    let hash = auth::hash_password(req.new_password).await?;
    repository::apply_password_reset(&state.db, &reset.token, &reset.user_id, &hash).await?;
    info!("password reset completed for {}", reset.user_id);

    Ok(MessageResponse::new("Password has been updated"))
}
