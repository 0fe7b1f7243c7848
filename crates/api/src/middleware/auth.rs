//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use hopinn_core::error::CoreError;
use hopinn_core::types::{DbId, Timestamp};
use hopinn_db::repositories::TokenBlacklistRepo;

use crate::auth::jwt::{validate_token, Claims};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Authenticated account extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Id in the table selected by `role` (from `claims.sub`).
    pub user_id: DbId,
    /// `"rider"` or `"captain"`.
    pub role: String,
    /// Token id, used to revoke this token on logout.
    pub jti: String,
    pub expires_at: Timestamp,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        let expires_at = claims.expires_at();
        Self {
            user_id: claims.sub,
            role: claims.role,
            jti: claims.jti,
            expires_at,
        }
    }
}

/// Validate the bearer token's signature and expiry. No database access.
pub(crate) fn decode_bearer(parts: &Parts, state: &AppState) -> AppResult<AuthUser> {
    let auth_header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Missing Authorization header".into())))?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>".into(),
        ))
    })?;

    let claims = validate_token(token, &state.config.jwt)
        .map_err(|_| AppError::Core(CoreError::Unauthorized("Invalid or expired token".into())))?;

    Ok(claims.into())
}

/// Reject tokens revoked by logout.
pub(crate) async fn ensure_not_revoked(user: &AuthUser, state: &AppState) -> AppResult<()> {
    if TokenBlacklistRepo::is_blacklisted(&state.pool, &user.jti).await? {
        return Err(AppError::Core(CoreError::Unauthorized("Token has been revoked".into())));
    }
    Ok(())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = decode_bearer(parts, state)?;
        ensure_not_revoked(&user, state).await?;
        Ok(user)
    }
}
