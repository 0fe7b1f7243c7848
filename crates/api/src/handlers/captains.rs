//! Handlers for the `/captains` resource (captain accounts and proximity
//! lookup).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use hopinn_core::error::CoreError;
use hopinn_core::geo::Coordinates;
use hopinn_core::roles::ROLE_CAPTAIN;
use hopinn_core::vehicle::VehicleType;
use hopinn_db::models::captain::{CaptainResponse, CreateCaptain};
use hopinn_db::repositories::CaptainRepo;

use super::auth::{check_password, hash, invalid_credentials, issue_token, normalize_email, revoke, FullName, LoginRequest, TokenResponse};
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppQuery};
use crate::middleware::rbac::{RequireCaptain, RequireRider};
use crate::response::MessageResponse;
use crate::rides::NearbyCaptains;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInput {
    #[validate(length(min = 3, message = "Color must be at least 3 characters long"))]
    pub color: String,
    #[validate(length(min = 3, message = "Plate must be at least 3 characters long"))]
    pub plate: String,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: i32,
    /// Parsed into [`VehicleType`] after validation.
    pub vehicle_type: String,
}

/// Request body for `POST /captains/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterCaptainRequest {
    #[validate(nested)]
    pub fullname: FullName,
    #[validate(email(message = "Invalid Email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[validate(nested)]
    pub vehicle: VehicleInput,
}

#[derive(Debug, Serialize)]
pub struct CaptainBody {
    pub captain: CaptainResponse,
}

#[derive(Debug, Serialize)]
pub struct CaptainProfileResponse {
    pub success: bool,
    pub captain: CaptainResponse,
}

/// Query for `GET /captains/nearby`, in the legacy `{ltd, lng}` naming.
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub ltd: f64,
    pub lng: f64,
    pub radius: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct NearbyCaptainsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: NearbyCaptains,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /captains/register
pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterCaptainRequest>,
) -> AppResult<(StatusCode, Json<TokenResponse<CaptainBody>>)> {
    input.validate()?;
    let vehicle_type: VehicleType = input.vehicle.vehicle_type.parse()?;
    let email = normalize_email(&input.email);

    if CaptainRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict("Email is already registered".into())));
    }

    let create = CreateCaptain {
        first_name: input.fullname.firstname.trim().to_string(),
        last_name: input.fullname.last_name(),
        email,
        password_hash: hash(&input.password)?,
        vehicle_color: input.vehicle.color.trim().to_string(),
        vehicle_plate: input.vehicle.plate.trim().to_string(),
        vehicle_capacity: input.vehicle.capacity,
        vehicle_type,
    };
    let captain = CaptainRepo::create(&state.pool, &create).await?;
    tracing::info!(captain_id = captain.id, vehicle = %vehicle_type, "Captain registered");

    let token = issue_token(&state, captain.id, ROLE_CAPTAIN)?;
    Ok((
        StatusCode::CREATED,
        Json(TokenResponse::new(
            token,
            CaptainBody {
                captain: captain.into(),
            },
        )),
    ))
}

/// POST /captains/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<TokenResponse<CaptainBody>>> {
    input.validate()?;

    let captain = CaptainRepo::find_by_email(&state.pool, &normalize_email(&input.email))
        .await?
        .ok_or_else(invalid_credentials)?;
    check_password(&input.password, &captain.password_hash)?;

    let token = issue_token(&state, captain.id, ROLE_CAPTAIN)?;
    Ok(Json(TokenResponse::new(
        token,
        CaptainBody {
            captain: captain.into(),
        },
    )))
}

/// GET /captains/profile
pub async fn profile(
    State(state): State<AppState>,
    RequireCaptain(auth): RequireCaptain,
) -> AppResult<Json<CaptainProfileResponse>> {
    let captain = CaptainRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Captain",
            id: auth.user_id,
        }))?;
    Ok(Json(CaptainProfileResponse {
        success: true,
        captain: captain.into(),
    }))
}

/// GET /captains/logout
pub async fn logout(
    State(state): State<AppState>,
    RequireCaptain(auth): RequireCaptain,
) -> AppResult<Json<MessageResponse>> {
    revoke(&state, &auth).await?;
    Ok(Json(MessageResponse::new("Logged out")))
}

/// GET /captains/nearby?ltd&lng&radius
///
/// `radiusEnforced` is `false` when the spatial lookup was unavailable and
/// the list is every active captain with a known position.
pub async fn nearby(
    State(state): State<AppState>,
    RequireRider(_): RequireRider,
    AppQuery(query): AppQuery<NearbyQuery>,
) -> AppResult<Json<NearbyCaptainsResponse>> {
    let center = Coordinates::try_new(query.ltd, query.lng)?;
    let result = state.rides.nearby_captains(center, query.radius).await?;
    Ok(Json(NearbyCaptainsResponse { success: true, result }))
}
