//! Route definitions for the `/captains` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::captains;
use crate::state::AppState;

/// Routes mounted at `/captains`.
///
/// ```text
/// POST /register  -> register
/// POST /login     -> login
/// GET  /profile   -> profile (captain)
/// GET  /logout    -> logout (captain)
/// GET  /nearby    -> nearby (rider)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(captains::register))
        .route("/login", post(captains::login))
        .route("/profile", get(captains::profile))
        .route("/logout", get(captains::logout))
        .route("/nearby", get(captains::nearby))
}
