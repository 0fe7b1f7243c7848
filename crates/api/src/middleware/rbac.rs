//! Role-based access control (RBAC) extractors.
//!
//! Each extractor checks the token's role before touching the database, so
//! a wrong-role request is rejected with 403 without a revocation lookup.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use hopinn_core::error::CoreError;
use hopinn_core::roles::{ROLE_CAPTAIN, ROLE_RIDER};

use super::auth::{decode_bearer, ensure_not_revoked, AuthUser};
use crate::error::AppError;
use crate::state::AppState;

async fn require_role(parts: &Parts, state: &AppState, role: &str, message: &str) -> Result<AuthUser, AppError> {
    let user = decode_bearer(parts, state)?;
    if user.role != role {
        return Err(AppError::Core(CoreError::Forbidden(message.into())));
    }
    ensure_not_revoked(&user, state).await?;
    Ok(user)
}

/// Requires a rider token. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn rider_only(RequireRider(user): RequireRider) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireRider(pub AuthUser);

impl FromRequestParts<AppState> for RequireRider {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require_role(parts, state, ROLE_RIDER, "Rider account required")
            .await
            .map(RequireRider)
    }
}

/// Requires a captain token. Rejects with 403 Forbidden otherwise.
pub struct RequireCaptain(pub AuthUser);

impl FromRequestParts<AppState> for RequireCaptain {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require_role(parts, state, ROLE_CAPTAIN, "Captain account required")
            .await
            .map(RequireCaptain)
    }
}
