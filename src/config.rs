use std::env;

/// Process-wide configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub jwt_secret: String,
    /// Session token validity from issuance. Tokens are not refreshable or
    /// revocable; they stay valid until expiry.
    pub token_ttl_hours: i64,
    /// Validity window of a password reset capability.
    pub reset_ttl_minutes: i64,
    /// Base URL the reset token is appended to when building the reset link.
    pub reset_url_base: String,
    /// Dev mode: return the reset URL in the API response instead of
    /// delivering it by email.
    pub expose_reset_url: bool,
    /// Single-tenant mode: habit routes are served without authentication,
    /// matching the standalone habit tracker. Set OPEN_HABIT_ROUTES=false to
    /// require a session token on them.
    pub open_habit_routes: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "dev-secret-change-me".to_string()),
            token_ttl_hours: env::var("TOKEN_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24),
            reset_ttl_minutes: env::var("RESET_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
            reset_url_base: env::var("RESET_URL_BASE")
                .unwrap_or_else(|_| "http://localhost:5173/reset-password".to_string()),
            expose_reset_url: env_flag("EXPOSE_RESET_URL", true),
            open_habit_routes: env_flag("OPEN_HABIT_ROUTES", true),
        }
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}
