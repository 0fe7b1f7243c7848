//! Route definitions for the `/rides` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::rides;
use crate::state::AppState;

/// Routes mounted at `/rides`.
///
/// ```text
/// POST /create      -> create (rider)
/// GET  /get-fare    -> get_fare (rider)
/// POST /confirm     -> confirm (captain)
/// GET  /start-ride  -> start_ride (captain)
/// POST /end-ride    -> end_ride (captain)
/// POST /cancel      -> cancel (rider)
/// GET  /history     -> history (rider)
/// GET  /pending     -> pending (captain)
/// GET  /{id}        -> get_by_id (ride's rider or captain)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(rides::create))
        .route("/get-fare", get(rides::get_fare))
        .route("/confirm", post(rides::confirm))
        .route("/start-ride", get(rides::start_ride))
        .route("/end-ride", post(rides::end_ride))
        .route("/cancel", post(rides::cancel))
        .route("/history", get(rides::history))
        .route("/pending", get(rides::pending))
        .route("/{id}", get(rides::get_by_id))
}
