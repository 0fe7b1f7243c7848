//! Handlers for the `/rides` resource.
//!
//! All lifecycle rules (fare freezing, OTP checks, atomic transitions,
//! notifications) live in [`crate::rides::RideService`]; these functions
//! only translate HTTP input and pick the response envelope.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use hopinn_core::error::CoreError;
use hopinn_core::fare::FareQuote;
use hopinn_core::roles::{ROLE_CAPTAIN, ROLE_RIDER};
use hopinn_core::types::DbId;
use hopinn_db::models::ride::{Ride, RideWithOtp};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireCaptain, RequireRider};
use crate::response::{DataResponse, RideResponse};
use crate::rides::{CreateRideRequest, FareQuery, RideHistoryEntry};
use crate::state::AppState;
use crate::ws::manager::Participant;

/// `{ rideId }` body shared by confirm, end-ride and cancel.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideIdRequest {
    #[serde(default)]
    pub ride_id: Option<DbId>,
}

impl RideIdRequest {
    fn ride_id(&self) -> Result<DbId, CoreError> {
        require_ride_id(self.ride_id)
    }
}

/// Query of `GET /rides/start-ride`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRideQuery {
    #[serde(default)]
    pub ride_id: Option<DbId>,
    #[serde(default)]
    pub otp: Option<String>,
}

fn require_ride_id(ride_id: Option<DbId>) -> Result<DbId, CoreError> {
    ride_id.ok_or_else(|| CoreError::Validation("rideId is required".into()))
}

/// POST /rides/create
///
/// Returns 201 with the ride including its OTP; this is the only response
/// that ever shows the OTP to the rider.
pub async fn create(
    State(state): State<AppState>,
    RequireRider(auth): RequireRider,
    AppJson(input): AppJson<CreateRideRequest>,
) -> AppResult<(StatusCode, Json<RideResponse<RideWithOtp>>)> {
    let ride = state.rides.create(auth.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(RideResponse::new(ride))))
}

/// GET /rides/get-fare?pickup&destination | ?campusPickupId&campusDestinationId
///
/// Returns the bare `{auto, car, moto}` map.
pub async fn get_fare(
    State(state): State<AppState>,
    RequireRider(_): RequireRider,
    AppQuery(query): AppQuery<FareQuery>,
) -> AppResult<Json<FareQuote>> {
    let quote = state.rides.fare_quote(&query).await?;
    Ok(Json(quote))
}

/// POST /rides/confirm
pub async fn confirm(
    State(state): State<AppState>,
    RequireCaptain(auth): RequireCaptain,
    AppJson(input): AppJson<RideIdRequest>,
) -> AppResult<Json<RideResponse<Ride>>> {
    let ride = state.rides.confirm(input.ride_id()?, auth.user_id).await?;
    Ok(Json(RideResponse::new(ride)))
}

/// GET /rides/start-ride?rideId&otp
pub async fn start_ride(
    State(state): State<AppState>,
    RequireCaptain(auth): RequireCaptain,
    AppQuery(query): AppQuery<StartRideQuery>,
) -> AppResult<Json<RideResponse<Ride>>> {
    let ride = state
        .rides
        .start(require_ride_id(query.ride_id)?, auth.user_id, query.otp.as_deref())
        .await?;
    Ok(Json(RideResponse::new(ride)))
}

/// POST /rides/end-ride
pub async fn end_ride(
    State(state): State<AppState>,
    RequireCaptain(auth): RequireCaptain,
    AppJson(input): AppJson<RideIdRequest>,
) -> AppResult<Json<RideResponse<Ride>>> {
    let ride = state.rides.end(input.ride_id()?, auth.user_id).await?;
    Ok(Json(RideResponse::new(ride)))
}

/// POST /rides/cancel
pub async fn cancel(
    State(state): State<AppState>,
    RequireRider(auth): RequireRider,
    AppJson(input): AppJson<RideIdRequest>,
) -> AppResult<Json<RideResponse<Ride>>> {
    let ride = state.rides.cancel(input.ride_id()?, auth.user_id).await?;
    Ok(Json(RideResponse::new(ride)))
}

/// GET /rides/history
pub async fn history(
    State(state): State<AppState>,
    RequireRider(auth): RequireRider,
) -> AppResult<Json<DataResponse<Vec<RideHistoryEntry>>>> {
    let rides = state.rides.history(auth.user_id).await?;
    Ok(Json(DataResponse::new(rides)))
}

/// GET /rides/pending
pub async fn pending(
    State(state): State<AppState>,
    RequireCaptain(_): RequireCaptain,
) -> AppResult<Json<DataResponse<Vec<Ride>>>> {
    let rides = state.rides.pending().await?;
    Ok(Json(DataResponse::new(rides)))
}

/// GET /rides/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<RideResponse<Ride>>> {
    let ride = state.rides.ride_for(id, viewer(&auth)?).await?;
    Ok(Json(RideResponse::new(ride)))
}

fn viewer(auth: &AuthUser) -> AppResult<Participant> {
    match auth.role.as_str() {
        ROLE_RIDER => Ok(Participant::rider(auth.user_id)),
        ROLE_CAPTAIN => Ok(Participant::captain(auth.user_id)),
        other => Err(AppError::Core(CoreError::Forbidden(format!("Unknown role '{other}'")))),
    }
}
