use hopinn_core::geo::Coordinates;
use hopinn_core::ride::CampusPoint;
use hopinn_core::ride_events::{CaptainProfile, ParticipantKind, RiderProfile};
use hopinn_core::types::DbId;
use hopinn_db::models::captain::{Captain, NearbyCaptain};
use hopinn_db::models::ride::{CreateRide, Ride, RideWithOtp};
use hopinn_db::repositories::{CampusLocationRepo, CaptainRepo, RideRepo, UserRepo};
use hopinn_db::DbPool;

use super::store::{Contact, PresenceStore, RideStore};
use crate::ws::manager::Participant;

/// [`RideStore`] and [`PresenceStore`] backed by the repositories.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn captain_contact(captain: Captain) -> Contact<CaptainProfile> {
    Contact {
        profile: captain.profile(),
        socket_id: captain.socket_id,
    }
}

impl RideStore for PgStore {
    async fn insert_ride(&self, input: &CreateRide) -> Result<RideWithOtp, sqlx::Error> {
        RideRepo::create(&self.pool, input).await
    }

    async fn find_ride(&self, id: DbId) -> Result<Option<Ride>, sqlx::Error> {
        RideRepo::find_by_id(&self.pool, id).await
    }

    async fn find_ride_with_otp(&self, id: DbId) -> Result<Option<RideWithOtp>, sqlx::Error> {
        RideRepo::find_with_otp(&self.pool, id).await
    }

    async fn accept_ride(&self, id: DbId, captain_id: DbId) -> Result<Option<RideWithOtp>, sqlx::Error> {
        RideRepo::accept(&self.pool, id, captain_id).await
    }

    async fn start_ride(&self, id: DbId, captain_id: DbId, otp: &str) -> Result<Option<Ride>, sqlx::Error> {
        RideRepo::start(&self.pool, id, captain_id, otp).await
    }

    async fn complete_ride(&self, id: DbId, captain_id: DbId) -> Result<Option<Ride>, sqlx::Error> {
        RideRepo::complete(&self.pool, id, captain_id).await
    }

    async fn cancel_ride(&self, id: DbId, rider_id: DbId) -> Result<Option<Ride>, sqlx::Error> {
        RideRepo::cancel(&self.pool, id, rider_id).await
    }

    async fn rides_for_rider(&self, rider_id: DbId) -> Result<Vec<Ride>, sqlx::Error> {
        RideRepo::list_for_rider(&self.pool, rider_id).await
    }

    async fn pending_rides(&self, limit: i64) -> Result<Vec<Ride>, sqlx::Error> {
        RideRepo::list_pending(&self.pool, limit).await
    }

    async fn rider(&self, id: DbId) -> Result<Option<Contact<RiderProfile>>, sqlx::Error> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?.map(|user| Contact {
            profile: user.profile(),
            socket_id: user.socket_id,
        }))
    }

    async fn captain(&self, id: DbId) -> Result<Option<Contact<CaptainProfile>>, sqlx::Error> {
        Ok(CaptainRepo::find_by_id(&self.pool, id).await?.map(captain_contact))
    }

    async fn campus_location(&self, id: DbId) -> Result<Option<CampusPoint>, sqlx::Error> {
        Ok(CampusLocationRepo::find_active(&self.pool, id)
            .await?
            .map(|loc| loc.to_point()))
    }

    async fn dispatch_targets(&self) -> Result<Vec<Contact<CaptainProfile>>, sqlx::Error> {
        Ok(CaptainRepo::list_connected_active(&self.pool)
            .await?
            .into_iter()
            .map(captain_contact)
            .collect())
    }

    async fn captains_within_radius(&self, center: Coordinates, radius_m: f64) -> Result<Vec<NearbyCaptain>, sqlx::Error> {
        Ok(CaptainRepo::list_within_radius(&self.pool, center, radius_m)
            .await?
            .into_iter()
            .map(|row| NearbyCaptain {
                location: row.captain.position(),
                captain: row.captain.profile(),
                distance_m: Some(row.distance_m),
            })
            .collect())
    }

    async fn active_captains_with_legacy_position(&self) -> Result<Vec<NearbyCaptain>, sqlx::Error> {
        Ok(CaptainRepo::list_active_with_legacy_position(&self.pool)
            .await?
            .into_iter()
            .map(|captain| NearbyCaptain {
                location: match (captain.legacy_ltd, captain.legacy_lng) {
                    (Some(ltd), Some(lng)) => Some(Coordinates::new(ltd, lng)),
                    _ => None,
                },
                captain: captain.profile(),
                distance_m: None,
            })
            .collect())
    }
}

impl PresenceStore for PgStore {
    async fn attach(&self, participant: Participant, socket_id: &str) -> Result<bool, sqlx::Error> {
        match participant.kind {
            ParticipantKind::Rider => UserRepo::attach_socket(&self.pool, participant.id, socket_id).await,
            ParticipantKind::Captain => CaptainRepo::attach_socket(&self.pool, participant.id, socket_id).await,
        }
    }

    async fn detach(&self, participant: Participant, socket_id: &str) -> Result<bool, sqlx::Error> {
        match participant.kind {
            ParticipantKind::Rider => UserRepo::detach_socket(&self.pool, participant.id, socket_id).await,
            ParticipantKind::Captain => CaptainRepo::detach_socket(&self.pool, participant.id, socket_id).await,
        }
    }

    async fn update_captain_position(&self, captain_id: DbId, at: Coordinates) -> Result<bool, sqlx::Error> {
        CaptainRepo::update_position(&self.pool, captain_id, at).await
    }
}
