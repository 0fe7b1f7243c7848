//! Handlers for the `/users` resource (rider accounts).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use hopinn_core::error::CoreError;
use hopinn_core::roles::ROLE_RIDER;
use hopinn_db::models::user::{CreateUser, UserResponse};
use hopinn_db::repositories::UserRepo;

use super::auth::{check_password, hash, invalid_credentials, issue_token, normalize_email, revoke, FullName, LoginRequest, TokenResponse};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::rbac::RequireRider;
use crate::response::MessageResponse;
use crate::state::AppState;

/// Request body for `POST /users/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(nested)]
    pub fullname: FullName,
    #[validate(email(message = "Invalid Email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

/// `{ user }`, flattened into token and profile responses.
#[derive(Debug, Serialize)]
pub struct UserBody {
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UserProfileResponse {
    pub success: bool,
    pub user: UserResponse,
}

/// POST /users/register
pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterUserRequest>,
) -> AppResult<(StatusCode, Json<TokenResponse<UserBody>>)> {
    input.validate()?;
    let email = normalize_email(&input.email);

    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict("Email is already registered".into())));
    }

    let create = CreateUser {
        first_name: input.fullname.firstname.trim().to_string(),
        last_name: input.fullname.last_name(),
        email,
        password_hash: hash(&input.password)?,
    };
    let user = UserRepo::create(&state.pool, &create).await?;
    tracing::info!(user_id = user.id, "Rider registered");

    let token = issue_token(&state, user.id, ROLE_RIDER)?;
    Ok((
        StatusCode::CREATED,
        Json(TokenResponse::new(token, UserBody { user: user.into() })),
    ))
}

/// POST /users/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<TokenResponse<UserBody>>> {
    input.validate()?;

    let user = UserRepo::find_by_email(&state.pool, &normalize_email(&input.email))
        .await?
        .ok_or_else(invalid_credentials)?;
    check_password(&input.password, &user.password_hash)?;

    let token = issue_token(&state, user.id, ROLE_RIDER)?;
    Ok(Json(TokenResponse::new(token, UserBody { user: user.into() })))
}

/// GET /users/profile
pub async fn profile(
    State(state): State<AppState>,
    RequireRider(auth): RequireRider,
) -> AppResult<Json<UserProfileResponse>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    Ok(Json(UserProfileResponse {
        success: true,
        user: user.into(),
    }))
}

/// GET /users/logout
pub async fn logout(
    State(state): State<AppState>,
    RequireRider(auth): RequireRider,
) -> AppResult<Json<MessageResponse>> {
    revoke(&state, &auth).await?;
    Ok(Json(MessageResponse::new("Logged out")))
}
