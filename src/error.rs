use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Blocking task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Admin privileges required")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("User ID or email is already in use")]
    DuplicateIdentity,

    #[error("Incorrect user ID or password")]
    InvalidCredentials,

    #[error("No user with that ID")]
    UnknownIdentity,

    #[error("Invalid or expired reset token")]
    InvalidReset,

    #[error("No active execution for this group")]
    NoActiveExecution,

    #[error("Execution already completed")]
    AlreadyCompleted,

    #[error("Internal server error")]
    InternalServerError,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Unauthenticated | AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::DuplicateIdentity | AppError::UnknownIdentity | AppError::InvalidReset => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::NoActiveExecution | AppError::AlreadyCompleted => {
                (StatusCode::CONFLICT, self.to_string())
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            AppError::Hash(e) => {
                error!("password hashing error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::TaskJoin(e) => {
                error!("blocking task failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
