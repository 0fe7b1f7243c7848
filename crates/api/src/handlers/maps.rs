//! Handlers for the `/maps` resource, thin wrappers over the external
//! maps provider.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use hopinn_maps::{validate_suggestion_input, DistanceTime, GeocodeResult, MapsProvider};

use crate::error::AppResult;
use crate::extract::AppQuery;
use crate::middleware::rbac::RequireRider;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CoordinatesQuery {
    #[validate(length(min = 3, max = 200, message = "Address must be between 3 and 200 characters"))]
    pub address: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DistanceTimeQuery {
    #[validate(length(min = 3, max = 200, message = "Origin must be between 3 and 200 characters"))]
    pub origin: String,
    #[validate(length(min = 3, max = 200, message = "Destination must be between 3 and 200 characters"))]
    pub destination: String,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsQuery {
    #[serde(default)]
    pub input: String,
}

/// GET /maps/get-coordinates?address
pub async fn get_coordinates(
    State(state): State<AppState>,
    RequireRider(_): RequireRider,
    AppQuery(query): AppQuery<CoordinatesQuery>,
) -> AppResult<Json<GeocodeResult>> {
    query.validate()?;
    let result = state.maps.geocode(query.address.trim()).await?;
    Ok(Json(result))
}

/// GET /maps/get-distance-time?origin&destination
pub async fn get_distance_time(
    State(state): State<AppState>,
    RequireRider(_): RequireRider,
    AppQuery(query): AppQuery<DistanceTimeQuery>,
) -> AppResult<Json<DistanceTime>> {
    query.validate()?;
    let result = state
        .maps
        .distance_time(query.origin.trim(), query.destination.trim())
        .await?;
    Ok(Json(result))
}

/// GET /maps/get-suggestions?input
///
/// Public. A query with no matches yields an empty list.
pub async fn get_suggestions(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SuggestionsQuery>,
) -> AppResult<Json<Vec<String>>> {
    let input = validate_suggestion_input(&query.input)?;
    let suggestions = state.maps.suggestions(input).await?;
    Ok(Json(suggestions))
}
