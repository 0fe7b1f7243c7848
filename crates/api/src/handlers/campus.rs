//! Handlers for the `/campus` reference directory.
//!
//! Any signed-in account (rider or captain) may read the directory.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use hopinn_core::campus::{self, LocationCategory, DEFAULT_NEARBY_RADIUS_M};
use hopinn_core::error::CoreError;
use hopinn_core::geo::{validate_radius_m, Coordinates};
use hopinn_core::types::DbId;
use hopinn_db::models::campus_location::{CampusLocation, NearbyLocation};
use hopinn_db::repositories::CampusLocationRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// `{ success, locations, count }`.
#[derive(Debug, Serialize)]
pub struct LocationsResponse<T: Serialize> {
    pub success: bool,
    pub locations: Vec<T>,
    pub count: usize,
}

impl<T: Serialize> LocationsResponse<T> {
    pub fn new(locations: Vec<T>) -> Self {
        Self {
            success: true,
            count: locations.len(),
            locations,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub success: bool,
    pub location: CampusLocation,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: Option<f64>,
}

/// GET /campus/locations
pub async fn list(State(state): State<AppState>, _auth: AuthUser) -> AppResult<Json<LocationsResponse<CampusLocation>>> {
    let locations = CampusLocationRepo::list_active(&state.pool).await?;
    Ok(Json(LocationsResponse::new(locations)))
}

/// GET /campus/search?query
///
/// Ranked exact name, then name prefix, then alias, then substring.
pub async fn search(
    State(state): State<AppState>,
    _auth: AuthUser,
    AppQuery(params): AppQuery<SearchQuery>,
) -> AppResult<Json<LocationsResponse<CampusLocation>>> {
    let query = campus::validate_search_query(&params.query)?;
    let locations = CampusLocationRepo::list_active(&state.pool).await?;
    let matches = campus::search(locations, query, CampusLocation::search_fields);
    Ok(Json(LocationsResponse::new(matches)))
}

/// GET /campus/locations/type/{category}
pub async fn list_by_category(
    State(state): State<AppState>,
    _auth: AuthUser,
    AppPath(category): AppPath<String>,
) -> AppResult<Json<LocationsResponse<CampusLocation>>> {
    let category: LocationCategory = category.parse()?;
    by_category(&state, category).await
}

/// GET /campus/hostels
pub async fn hostels(State(state): State<AppState>, _auth: AuthUser) -> AppResult<Json<LocationsResponse<CampusLocation>>> {
    by_category(&state, LocationCategory::Hostel).await
}

/// GET /campus/gates
pub async fn gates(State(state): State<AppState>, _auth: AuthUser) -> AppResult<Json<LocationsResponse<CampusLocation>>> {
    by_category(&state, LocationCategory::Gate).await
}

async fn by_category(state: &AppState, category: LocationCategory) -> AppResult<Json<LocationsResponse<CampusLocation>>> {
    let locations = CampusLocationRepo::list_by_category(&state.pool, category).await?;
    Ok(Json(LocationsResponse::new(locations)))
}

/// GET /campus/locations/nearby?latitude&longitude&radius
///
/// Nearest first; `radius` defaults to 1000 m.
pub async fn nearby(
    State(state): State<AppState>,
    _auth: AuthUser,
    AppQuery(params): AppQuery<NearbyQuery>,
) -> AppResult<Json<LocationsResponse<NearbyLocation>>> {
    let center = Coordinates::try_new(params.latitude, params.longitude)?;
    let radius_m = params.radius.unwrap_or(DEFAULT_NEARBY_RADIUS_M);
    validate_radius_m(radius_m)?;

    let locations = CampusLocationRepo::list_active(&state.pool).await?;
    let nearby = nearby_locations(locations, &center, radius_m);
    Ok(Json(LocationsResponse::new(nearby)))
}

fn nearby_locations(locations: Vec<CampusLocation>, center: &Coordinates, radius_m: f64) -> Vec<NearbyLocation> {
    campus::within_radius(locations, center, radius_m, CampusLocation::coordinates)
        .into_iter()
        .map(|(location, distance_m)| NearbyLocation { location, distance_m })
        .collect()
}

/// GET /campus/locations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<LocationResponse>> {
    let location = CampusLocationRepo::find_active(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CampusLocation",
            id,
        }))?;
    Ok(Json(LocationResponse {
        success: true,
        location,
    }))
}
