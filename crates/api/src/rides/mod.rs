//! Ride lifecycle service and its persistence seams.

pub mod postgres;
pub mod service;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use postgres::PgStore;
pub use service::{CreateRideRequest, FareQuery, NearbyCaptains, RideHistoryEntry, RideService};
pub use store::{Contact, PresenceStore, RideStore};

use hopinn_maps::GoogleMapsClient;

use crate::notifications::WsNotifier;

/// The service as wired into the running server.
pub type AppRideService = RideService<PgStore, WsNotifier, GoogleMapsClient>;
