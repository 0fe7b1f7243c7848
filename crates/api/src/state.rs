use std::sync::Arc;

use hopinn_maps::GoogleMapsClient;

use crate::config::ServerConfig;
use crate::notifications::WsNotifier;
use crate::rides::{AppRideService, PgStore, RideService};
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: hopinn_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Live WebSocket connections.
    pub ws_manager: Arc<WsManager>,
    /// External maps provider, shared with the ride service.
    pub maps: Arc<GoogleMapsClient>,
    /// Ride lifecycle wired to PostgreSQL and the WebSocket notifier.
    pub rides: Arc<AppRideService>,
}

impl AppState {
    /// Wire the ride service and notifier around shared resources.
    pub fn new(
        pool: hopinn_db::DbPool,
        config: Arc<ServerConfig>,
        ws_manager: Arc<WsManager>,
        maps: Arc<GoogleMapsClient>,
    ) -> Self {
        let rides = RideService::new(
            PgStore::new(pool.clone()),
            WsNotifier::new(Arc::clone(&ws_manager)),
            Arc::clone(&maps),
            config.captain_search_radius_m,
        );
        Self {
            pool,
            config,
            ws_manager,
            maps,
            rides: Arc::new(rides),
        }
    }

    /// Presence bookkeeping for the WebSocket channel.
    pub fn presence_store(&self) -> PgStore {
        PgStore::new(self.pool.clone())
    }
}
