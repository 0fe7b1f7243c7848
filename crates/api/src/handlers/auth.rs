//! Helpers shared by the rider and captain account handlers.

use serde::{Deserialize, Serialize};
use validator::Validate;

use hopinn_core::error::CoreError;
use hopinn_core::types::DbId;
use hopinn_db::repositories::TokenBlacklistRepo;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// `{ firstname, lastname }` as sent by the signup forms.
#[derive(Debug, Deserialize, Validate)]
pub struct FullName {
    #[validate(length(min = 3, message = "First name must be at least 3 characters long"))]
    pub firstname: String,
    #[serde(default)]
    pub lastname: Option<String>,
}

impl FullName {
    /// Trimmed last name, `None` when blank.
    pub fn last_name(&self) -> Option<String> {
        self.lastname
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Request body for both login endpoints.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid Email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

/// `{ success, token, <key>: account }` returned by signup and login.
#[derive(Debug, Serialize)]
pub struct TokenResponse<T: Serialize> {
    pub success: bool,
    pub token: String,
    #[serde(flatten)]
    pub account: T,
}

impl<T: Serialize> TokenResponse<T> {
    pub fn new(token: String, account: T) -> Self {
        Self {
            success: true,
            token,
            account,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Emails are compared case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn hash(password: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

/// Fail with the generic credentials message unless `password` matches.
pub fn check_password(password: &str, password_hash: &str) -> AppResult<()> {
    let valid = verify_password(password, password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        return Err(invalid_credentials());
    }
    Ok(())
}

pub fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into()))
}

pub fn issue_token(state: &AppState, id: DbId, role: &str) -> AppResult<String> {
    generate_access_token(id, role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))
}

/// Blacklist the caller's token until it would have expired anyway.
pub async fn revoke(state: &AppState, user: &AuthUser) -> AppResult<()> {
    TokenBlacklistRepo::insert(&state.pool, &user.jti, user.expires_at).await?;
    tracing::info!(user_id = user.user_id, role = %user.role, "Token revoked");
    Ok(())
}
