//! Persistence seams used by the ride lifecycle and the presence handlers.
//!
//! [`PgStore`](super::postgres::PgStore) implements both traits against
//! PostgreSQL; tests substitute an in-memory store.

use std::future::Future;

use hopinn_core::geo::Coordinates;
use hopinn_core::ride::CampusPoint;
use hopinn_core::ride_events::{CaptainProfile, RiderProfile};
use hopinn_core::types::DbId;
use hopinn_db::models::captain::NearbyCaptain;
use hopinn_db::models::ride::{CreateRide, Ride, RideWithOtp};

use crate::ws::manager::Participant;

/// A public profile plus the live connection handle, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact<P> {
    pub profile: P,
    pub socket_id: Option<String>,
}

/// Ride rows and the account lookups the lifecycle needs.
///
/// Transition methods are atomic compare-and-set operations: they return
/// `None` when the ride is not in the expected prior state (or does not
/// belong to the caller) and leave it untouched.
pub trait RideStore: Send + Sync {
    fn insert_ride(&self, input: &CreateRide) -> impl Future<Output = Result<RideWithOtp, sqlx::Error>> + Send;

    fn find_ride(&self, id: DbId) -> impl Future<Output = Result<Option<Ride>, sqlx::Error>> + Send;

    fn find_ride_with_otp(&self, id: DbId) -> impl Future<Output = Result<Option<RideWithOtp>, sqlx::Error>> + Send;

    /// `pending` with no captain -> `accepted`, assigned to `captain_id`.
    fn accept_ride(
        &self,
        id: DbId,
        captain_id: DbId,
    ) -> impl Future<Output = Result<Option<RideWithOtp>, sqlx::Error>> + Send;

    /// `accepted` -> `ongoing`, guarded on captain and OTP.
    fn start_ride(
        &self,
        id: DbId,
        captain_id: DbId,
        otp: &str,
    ) -> impl Future<Output = Result<Option<Ride>, sqlx::Error>> + Send;

    /// `ongoing` -> `completed`, guarded on captain.
    fn complete_ride(&self, id: DbId, captain_id: DbId) -> impl Future<Output = Result<Option<Ride>, sqlx::Error>> + Send;

    /// `pending | accepted` -> `cancelled`, guarded on rider.
    fn cancel_ride(&self, id: DbId, rider_id: DbId) -> impl Future<Output = Result<Option<Ride>, sqlx::Error>> + Send;

    fn rides_for_rider(&self, rider_id: DbId) -> impl Future<Output = Result<Vec<Ride>, sqlx::Error>> + Send;

    fn pending_rides(&self, limit: i64) -> impl Future<Output = Result<Vec<Ride>, sqlx::Error>> + Send;

    fn rider(&self, id: DbId) -> impl Future<Output = Result<Option<Contact<RiderProfile>>, sqlx::Error>> + Send;

    fn captain(&self, id: DbId) -> impl Future<Output = Result<Option<Contact<CaptainProfile>>, sqlx::Error>> + Send;

    /// An active campus location as a ride snapshot.
    fn campus_location(&self, id: DbId) -> impl Future<Output = Result<Option<CampusPoint>, sqlx::Error>> + Send;

    /// Active captains holding a live connection handle.
    fn dispatch_targets(&self) -> impl Future<Output = Result<Vec<Contact<CaptainProfile>>, sqlx::Error>> + Send;

    /// Active, connected captains within `radius_m` of `center`.
    fn captains_within_radius(
        &self,
        center: Coordinates,
        radius_m: f64,
    ) -> impl Future<Output = Result<Vec<NearbyCaptain>, sqlx::Error>> + Send;

    /// Every active captain with a legacy position. No radius filter.
    fn active_captains_with_legacy_position(
        &self,
    ) -> impl Future<Output = Result<Vec<NearbyCaptain>, sqlx::Error>> + Send;
}

/// Connection bookkeeping written by the real-time channel.
pub trait PresenceStore: Send + Sync {
    /// Store `socket_id` on the account; captains also become active.
    /// `false` if the account does not exist.
    fn attach(
        &self,
        participant: Participant,
        socket_id: &str,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    /// Clear the handle (captains become inactive) only while it still
    /// equals `socket_id`.
    fn detach(
        &self,
        participant: Participant,
        socket_id: &str,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    fn update_captain_position(
        &self,
        captain_id: DbId,
        at: Coordinates,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
}
