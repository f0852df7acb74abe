use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::auth::{Claims, verify_token};
use crate::error::AppError;
use crate::state::AppState;

/// Requires a valid bearer token; hands the resolved claims to the handler.
/// Missing, malformed, expired and tampered tokens all collapse to 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

/// `AuthUser` plus the admin role. A valid non-admin token gets 403, which is
/// deliberately distinct from the 401 for a bad token.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

/// Token if one was presented. An absent header is `None`; a header that is
/// present but invalid still fails with 401.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<Claims>);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthenticated)?;
        let claims = verify_token(token, &state.config.jwt_secret)
            .map_err(|_| AppError::Unauthenticated)?;
        Ok(AuthUser(claims))
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.is_admin {
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(claims))
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if parts.headers.get(header::AUTHORIZATION).is_none() {
            return Ok(MaybeAuthUser(None));
        }
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        Ok(MaybeAuthUser(Some(claims)))
    }
}
