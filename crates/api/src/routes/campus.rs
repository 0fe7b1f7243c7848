//! Route definitions for the `/campus` reference directory.

use axum::routing::get;
use axum::Router;

use crate::handlers::campus;
use crate::state::AppState;

/// Routes mounted at `/campus`. Static segments take precedence over
/// `/locations/{id}`.
///
/// ```text
/// GET /locations                   -> list
/// GET /locations/nearby            -> nearby
/// GET /locations/type/{category}   -> list_by_category
/// GET /locations/{id}              -> get_by_id
/// GET /search                      -> search
/// GET /hostels                     -> hostels
/// GET /gates                       -> gates
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/locations", get(campus::list))
        .route("/locations/nearby", get(campus::nearby))
        .route("/locations/type/{category}", get(campus::list_by_category))
        .route("/locations/{id}", get(campus::get_by_id))
        .route("/search", get(campus::search))
        .route("/hostels", get(campus::hostels))
        .route("/gates", get(campus::gates))
}
