pub mod campus;
pub mod captains;
pub mod health;
pub mod maps;
pub mod rides;
pub mod users;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the API route tree, mounted at the root.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                  WebSocket (join, update-location-captain)
///
/// /users/register                      rider signup (public)
/// /users/login                         rider login (public)
/// /users/profile                       rider profile
/// /users/logout                        revoke rider token
///
/// /captains/register                   captain signup (public)
/// /captains/login                      captain login (public)
/// /captains/profile                    captain profile
/// /captains/logout                     revoke captain token
/// /captains/nearby                     captains near a point (rider)
///
/// /rides/create                        request a ride (rider, POST)
/// /rides/get-fare                      fare quote (rider)
/// /rides/confirm                       claim a pending ride (captain, POST)
/// /rides/start-ride                    start with OTP (captain)
/// /rides/end-ride                      complete an ongoing ride (captain, POST)
/// /rides/cancel                        cancel before start (rider, POST)
/// /rides/history                       rider's rides, newest first
/// /rides/pending                       captain dashboard
/// /rides/{id}                          single ride (its rider or captain)
///
/// /maps/get-coordinates                geocode an address (rider)
/// /maps/get-distance-time              route distance and duration (rider)
/// /maps/get-suggestions                autocomplete (public)
///
/// /campus/locations                    all active locations
/// /campus/locations/{id}               single location
/// /campus/locations/type/{category}    locations of one category
/// /campus/locations/nearby             locations within a radius
/// /campus/search                       ranked text search
/// /campus/hostels                      hostels
/// /campus/gates                        gates
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/users", users::router())
        .nest("/captains", captains::router())
        .nest("/rides", rides::router())
        .nest("/maps", maps::router())
        .nest("/campus", campus::router())
}
