use axum::routing::get;
use axum::Router;

use crate::handlers::maps;
use crate::state::AppState;

/// Routes mounted at `/maps`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get-coordinates", get(maps::get_coordinates))
        .route("/get-distance-time", get(maps::get_distance_time))
        .route("/get-suggestions", get(maps::get_suggestions))
}
