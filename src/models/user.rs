use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row, internal only. Never serialized to a client.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: String,
}

/// User fields safe for client responses (no password hash).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub id: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub id: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Admin partial update. Absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub is_admin: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetRequest {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetRequestResponse {
    pub message: String,
    /// Included only when the server runs with EXPOSE_RESET_URL (dev mode);
    /// stands in for email delivery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetConfirmRequest {
    pub token: String,
    pub new_password: String,
}

/// One-time password reset capability.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordReset {
    pub token: String,
    pub user_id: String,
    pub expires_at: String,
    pub used: bool,
}
