pub mod extract;

pub use extract::{AdminUser, AuthUser, MaybeAuthUser};

use bcrypt::DEFAULT_COST;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppConfig;
use crate::error::AppError;

/// JWT claims carried by a session token. Self-contained: verification needs
/// no user lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token has expired")]
    Expired,
    #[error("token signature is invalid")]
    SignatureInvalid,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
            _ => TokenError::Malformed,
        }
    }
}

pub fn issue_token(user_id: &str, is_admin: bool, config: &AppConfig) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_owned(),
        is_admin,
        iat: now.timestamp(),
        exp: (now + chrono::Duration::hours(config.token_ttl_hours)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|_| AppError::InternalServerError)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

/// bcrypt is blocking, so hashing runs on the blocking thread pool.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, DEFAULT_COST)).await??;
    Ok(hash)
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    let ok = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            port: 0,
            jwt_secret: "unit-test-secret".to_string(),
            token_ttl_hours: 24,
            reset_ttl_minutes: 15,
            reset_url_base: String::new(),
            expose_reset_url: true,
            open_habit_routes: true,
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let config = test_config();
        let token = issue_token("alice", true, &config).unwrap();
        let claims = verify_token(&token, &config.jwt_secret).unwrap();
        assert_eq!(claims.sub, "alice");
        assert!(claims.is_admin);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = test_config();
        let token = issue_token("alice", false, &config).unwrap();
        let err = verify_token(&token, "other-secret").unwrap_err();
        assert!(matches!(err, TokenError::SignatureInvalid));
    }

    #[test]
    fn garbage_is_malformed() {
        let err = verify_token("not-a-jwt", "unit-test-secret").unwrap_err();
        assert!(matches!(err, TokenError::Malformed));
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let hash = hash_password("hunter2".to_string()).await.unwrap();
        assert!(verify_password("hunter2".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("hunter3".to_string(), hash).await.unwrap());
    }
}
