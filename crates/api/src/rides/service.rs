//! Ride lifecycle: creation and pricing, the OTP-gated state machine, and
//! the push notifications each transition triggers.
//!
//! Every transition goes through a single compare-and-set on the store.
//! When the guard fails the ride is re-read only to pick the right error;
//! the re-read never drives a write.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use hopinn_core::error::CoreError;
use hopinn_core::fare::{campus_quote, external_quote, FareQuote, PricedTrip};
use hopinn_core::geo::{validate_radius_m, Coordinates};
use hopinn_core::otp::{generate_otp, otp_matches};
use hopinn_core::ride::{require_text, CampusPoint, Endpoint, RideStatus};
use hopinn_core::ride_events::{
    CaptainProfile, NewRide, ParticipantKind, RideCancelled, RideConfirmed, RideStatusChange, ServerEvent,
};
use hopinn_core::types::DbId;
use hopinn_core::vehicle::VehicleType;
use hopinn_db::models::captain::NearbyCaptain;
use hopinn_db::models::ride::{CreateRide, Ride, RideWithOtp};
use hopinn_maps::MapsProvider;
use serde::{Deserialize, Serialize};

use super::store::RideStore;
use crate::error::AppResult;
use crate::notifications::Notifier;
use crate::ws::manager::Participant;

/// How many rides the captain dashboard shows.
pub const PENDING_DASHBOARD_LIMIT: i64 = 10;

const CANCELLED_BY_RIDER: &str = "Cancelled by user";

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// Reference to a campus location chosen by the client. Only the id is
/// trusted; name and coordinates are read back from the directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampusRef {
    pub location_id: DbId,
}

/// Body of `POST /rides/create`. Unknown fields (including any `otp`) are
/// ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRideRequest {
    #[serde(default)]
    pub pickup: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub campus_pickup: Option<CampusRef>,
    #[serde(default)]
    pub campus_destination: Option<CampusRef>,
}

/// Query of `GET /rides/get-fare`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareQuery {
    pub pickup: Option<String>,
    pub destination: Option<String>,
    pub campus_pickup_id: Option<DbId>,
    pub campus_destination_id: Option<DbId>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyCaptains {
    pub captains: Vec<NearbyCaptain>,
    /// `false` when the spatial lookup failed and the unfiltered fallback
    /// was used instead.
    pub radius_enforced: bool,
}

/// A row of the rider's history: the ride plus the public profile of the
/// captain who confirmed it, if any.
#[derive(Debug, Clone, Serialize)]
pub struct RideHistoryEntry {
    #[serde(flatten)]
    pub ride: Ride,
    pub captain: Option<CaptainProfile>,
}

fn required<'a>(field: &str, value: &'a Option<String>) -> Result<&'a str, CoreError> {
    let value = value.as_deref().unwrap_or_default();
    require_text(field, value)?;
    Ok(value.trim())
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub struct RideService<S, N, M> {
    store: S,
    notifier: N,
    maps: Arc<M>,
    captain_radius_m: f64,
}

impl<S, N, M> RideService<S, N, M>
where
    S: RideStore,
    N: Notifier,
    M: MapsProvider,
{
    pub fn new(store: S, notifier: N, maps: Arc<M>, captain_radius_m: f64) -> Self {
        Self {
            store,
            notifier,
            maps,
            captain_radius_m,
        }
    }

    // -- creation and pricing --

    /// Price, persist and announce a new pending ride.
    ///
    /// Campus rides (both ends given as campus location ids) are priced
    /// locally and broadcast to every connected active captain. Any other
    /// ride is resolved through the maps provider first; a resolution
    /// failure aborts before anything is written.
    pub async fn create(&self, rider_id: DbId, req: &CreateRideRequest) -> AppResult<RideWithOtp> {
        let pickup_text = required("pickup", &req.pickup)?;
        let destination_text = required("destination", &req.destination)?;
        let vehicle_type: VehicleType = required("vehicleType", &req.vehicle_type)?.parse()?;

        let rider = self
            .store
            .rider(rider_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "User",
                id: rider_id,
            })?;

        let (pickup, destination, priced) = match (&req.campus_pickup, &req.campus_destination) {
            (Some(p), Some(d)) => {
                let p = self.campus_point(p.location_id).await?;
                let d = self.campus_point(d.location_id).await?;
                let priced = campus_quote(&p.coordinates, &d.coordinates)?;
                (Endpoint::Campus(p), Endpoint::Campus(d), priced)
            }
            _ => {
                let priced = self.external_price(pickup_text, destination_text, true).await?;
                (
                    Endpoint::Address {
                        address: pickup_text.to_string(),
                    },
                    Endpoint::Address {
                        address: destination_text.to_string(),
                    },
                    priced,
                )
            }
        };

        let input = CreateRide::new(rider_id, pickup, destination, vehicle_type, &priced, generate_otp());
        let created = self.store.insert_ride(&input).await?;
        tracing::info!(
            ride_id = created.ride.id,
            rider_id,
            fare = created.ride.fare,
            campus = created.ride.is_campus(),
            "Ride created"
        );

        if created.ride.is_campus() {
            let event = ServerEvent::NewRide(NewRide {
                ride_id: created.ride.id,
                user: rider.profile,
                pickup: created.ride.pickup_endpoint(),
                destination: created.ride.destination_endpoint(),
                fare: created.ride.fare,
                vehicle_type: created.ride.vehicle_type,
                otp: created.otp.clone(),
            });
            self.dispatch(&event).await;
        }

        Ok(created)
    }

    /// Quote every vehicle type without creating a ride.
    pub async fn fare_quote(&self, query: &FareQuery) -> AppResult<FareQuote> {
        if let (Some(p), Some(d)) = (query.campus_pickup_id, query.campus_destination_id) {
            let p = self.campus_point(p).await?;
            let d = self.campus_point(d).await?;
            return Ok(campus_quote(&p.coordinates, &d.coordinates)?.quote);
        }

        let pickup = required("pickup", &query.pickup)?;
        let destination = required("destination", &query.destination)?;
        Ok(self.external_price(pickup, destination, false).await?.quote)
    }

    async fn campus_point(&self, id: DbId) -> AppResult<CampusPoint> {
        Ok(self
            .store
            .campus_location(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "CampusLocation",
                id,
            })?)
    }

    /// Distance and duration from the provider, priced with the external
    /// rates. With `geocode` set both addresses must resolve first.
    async fn external_price(&self, pickup: &str, destination: &str, geocode: bool) -> AppResult<PricedTrip> {
        if geocode {
            self.maps.geocode(pickup).await?;
            self.maps.geocode(destination).await?;
        }
        let route = self.maps.distance_time(pickup, destination).await?;
        Ok(external_quote(route.distance.value, route.duration.value)?)
    }

    /// Push `event` to every connected active captain. Failures are logged
    /// per recipient and never abort the others.
    async fn dispatch(&self, event: &ServerEvent) {
        let targets = match self.store.dispatch_targets().await {
            Ok(targets) => targets,
            Err(e) => {
                tracing::warn!(error = %e, event = event.name(), "Could not load dispatch targets");
                return;
            }
        };

        let sends = targets.iter().filter_map(|target| {
            let handle = target.socket_id.as_deref()?;
            let captain_id = target.profile.id;
            Some(async move {
                match self.notifier.send(handle, event).await {
                    Ok(true) => true,
                    Ok(false) => {
                        tracing::debug!(captain_id, event = event.name(), "Captain handle not live");
                        false
                    }
                    Err(e) => {
                        tracing::warn!(captain_id, error = %e, event = event.name(), "Push to captain failed");
                        false
                    }
                }
            })
        });
        let delivered = join_all(sends).await.into_iter().filter(|ok| *ok).count();
        tracing::debug!(
            ride_id = event.ride_id(),
            recipients = targets.len(),
            delivered,
            "Ride dispatched"
        );
    }

    /// Best-effort push to a single handle.
    async fn notify(&self, handle: Option<&str>, event: &ServerEvent) {
        let Some(handle) = handle else {
            tracing::debug!(event = event.name(), ride_id = event.ride_id(), "Recipient not connected");
            return;
        };
        match self.notifier.send(handle, event).await {
            Ok(true) => {}
            Ok(false) => tracing::debug!(event = event.name(), ride_id = event.ride_id(), "Recipient handle not live"),
            Err(e) => tracing::warn!(error = %e, event = event.name(), ride_id = event.ride_id(), "Push failed"),
        }
    }

    async fn rider_handle(&self, rider_id: DbId) -> Option<String> {
        match self.store.rider(rider_id).await {
            Ok(contact) => contact.and_then(|c| c.socket_id),
            Err(e) => {
                tracing::warn!(rider_id, error = %e, "Could not load rider for notification");
                None
            }
        }
    }

    // -- transitions --

    /// Claim a pending ride for `captain_id` and hand the OTP to the rider.
    pub async fn confirm(&self, ride_id: DbId, captain_id: DbId) -> AppResult<Ride> {
        let captain = self
            .store
            .captain(captain_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Captain",
                id: captain_id,
            })?;

        let Some(accepted) = self.store.accept_ride(ride_id, captain_id).await? else {
            return Err(match self.store.find_ride(ride_id).await? {
                None => CoreError::NotFound {
                    entity: "Ride",
                    id: ride_id,
                },
                Some(ride) => CoreError::Conflict(format!("Ride is {} and can no longer be confirmed", ride.status)),
            }
            .into());
        };
        tracing::info!(ride_id, captain_id, "Ride confirmed");

        let handle = self.rider_handle(accepted.ride.rider_id).await;
        let event = ServerEvent::RideConfirmed(RideConfirmed {
            ride_id,
            captain: captain.profile,
            otp: accepted.otp,
        });
        self.notify(handle.as_deref(), &event).await;

        Ok(accepted.ride)
    }

    /// Start an accepted ride once the assigned captain presents the OTP.
    pub async fn start(&self, ride_id: DbId, captain_id: DbId, otp: Option<&str>) -> AppResult<Ride> {
        let otp = otp.unwrap_or_default().trim();
        require_text("otp", otp)?;

        let current = self
            .store
            .find_ride_with_otp(ride_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Ride",
                id: ride_id,
            })?;
        if current.ride.status != RideStatus::Accepted {
            return Err(CoreError::Conflict(format!("Ride is {} and cannot be started", current.ride.status)).into());
        }
        if current.ride.captain_id != Some(captain_id) {
            return Err(CoreError::Forbidden("Ride is assigned to another captain".into()).into());
        }
        if !otp_matches(&current.otp, otp) {
            return Err(CoreError::Forbidden("Invalid OTP".into()).into());
        }

        let started = self
            .store
            .start_ride(ride_id, captain_id, otp)
            .await?
            .ok_or_else(|| CoreError::Conflict("Ride changed state before it could be started".into()))?;
        tracing::info!(ride_id, captain_id, "Ride started");

        let handle = self.rider_handle(started.rider_id).await;
        let event = ServerEvent::RideStarted(RideStatusChange {
            ride_id,
            status: started.status,
        });
        self.notify(handle.as_deref(), &event).await;

        Ok(started)
    }

    /// Complete an ongoing ride owned by `captain_id`.
    pub async fn end(&self, ride_id: DbId, captain_id: DbId) -> AppResult<Ride> {
        let Some(completed) = self.store.complete_ride(ride_id, captain_id).await? else {
            return Err(match self.store.find_ride(ride_id).await? {
                Some(ride) if ride.captain_id == Some(captain_id) => {
                    CoreError::Conflict(format!("Ride is {} and cannot be ended", ride.status))
                }
                _ => CoreError::NotFound {
                    entity: "Ride",
                    id: ride_id,
                },
            }
            .into());
        };
        tracing::info!(ride_id, captain_id, "Ride completed");

        let handle = self.rider_handle(completed.rider_id).await;
        let event = ServerEvent::RideCompleted(RideStatusChange {
            ride_id,
            status: completed.status,
        });
        self.notify(handle.as_deref(), &event).await;

        Ok(completed)
    }

    /// Cancel a ride owned by `rider_id` that has not started.
    pub async fn cancel(&self, ride_id: DbId, rider_id: DbId) -> AppResult<Ride> {
        let Some(cancelled) = self.store.cancel_ride(ride_id, rider_id).await? else {
            return Err(match self.store.find_ride(ride_id).await? {
                Some(ride) if ride.rider_id == rider_id => {
                    CoreError::Conflict(format!("Ride is {} and can no longer be cancelled", ride.status))
                }
                _ => CoreError::NotFound {
                    entity: "Ride",
                    id: ride_id,
                },
            }
            .into());
        };
        tracing::info!(ride_id, rider_id, "Ride cancelled");

        if let Some(captain_id) = cancelled.captain_id {
            let handle = match self.store.captain(captain_id).await {
                Ok(contact) => contact.and_then(|c| c.socket_id),
                Err(e) => {
                    tracing::warn!(captain_id, error = %e, "Could not load captain for notification");
                    None
                }
            };
            let event = ServerEvent::RideCancelled(RideCancelled {
                ride_id,
                message: CANCELLED_BY_RIDER.to_string(),
            });
            self.notify(handle.as_deref(), &event).await;
        }

        Ok(cancelled)
    }

    // -- reads --

    /// A ride as seen by one of its participants. Rides the caller is not
    /// part of are reported as missing.
    pub async fn ride_for(&self, ride_id: DbId, viewer: Participant) -> AppResult<Ride> {
        let visible = |ride: &Ride| match viewer.kind {
            ParticipantKind::Rider => ride.rider_id == viewer.id,
            ParticipantKind::Captain => ride.captain_id == Some(viewer.id),
        };
        match self.store.find_ride(ride_id).await? {
            Some(ride) if visible(&ride) => Ok(ride),
            _ => Err(CoreError::NotFound {
                entity: "Ride",
                id: ride_id,
            }
            .into()),
        }
    }

    /// The rider's rides, newest first, each with its captain's profile.
    pub async fn history(&self, rider_id: DbId) -> AppResult<Vec<RideHistoryEntry>> {
        let rides = self.store.rides_for_rider(rider_id).await?;
        let mut profiles: HashMap<DbId, Option<CaptainProfile>> = HashMap::new();
        let mut entries = Vec::with_capacity(rides.len());

        for ride in rides {
            let captain = match ride.captain_id {
                Some(captain_id) => {
                    if !profiles.contains_key(&captain_id) {
                        let profile = self.store.captain(captain_id).await?.map(|c| c.profile);
                        profiles.insert(captain_id, profile);
                    }
                    profiles.get(&captain_id).cloned().flatten()
                }
                None => None,
            };
            entries.push(RideHistoryEntry { ride, captain });
        }
        Ok(entries)
    }

    /// Most recent pending rides for the captain dashboard.
    pub async fn pending(&self) -> AppResult<Vec<Ride>> {
        Ok(self.store.pending_rides(PENDING_DASHBOARD_LIMIT).await?)
    }

    /// Connected active captains near `center`.
    ///
    /// Falls back to every active captain with a legacy position when the
    /// spatial query fails; the result then reports `radius_enforced =
    /// false`.
    pub async fn nearby_captains(&self, center: Coordinates, radius_m: Option<f64>) -> AppResult<NearbyCaptains> {
        center.validate()?;
        let radius_m = radius_m.unwrap_or(self.captain_radius_m);
        validate_radius_m(radius_m)?;

        match self.store.captains_within_radius(center, radius_m).await {
            Ok(captains) => Ok(NearbyCaptains {
                captains,
                radius_enforced: true,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "Spatial captain lookup failed; using unfiltered fallback");
                let captains = self.store.active_captains_with_legacy_position().await?;
                Ok(NearbyCaptains {
                    captains,
                    radius_enforced: false,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use hopinn_core::fare::campus_quote;
    use hopinn_core::otp::is_well_formed;

    use super::*;
    use crate::error::AppError;
    use crate::rides::testing::{FakeMaps, MemoryStore, RecordingNotifier, HOSTEL_5, MAIN_GATE};

    type TestService = RideService<MemoryStore, RecordingNotifier, FakeMaps>;

    const RIDER: DbId = 1;
    const CAPTAIN_A: DbId = 10;
    const CAPTAIN_B: DbId = 11;
    const CAPTAIN_C: DbId = 12;

    fn service(store: MemoryStore, notifier: RecordingNotifier) -> TestService {
        RideService::new(store, notifier, Arc::new(FakeMaps::default()), 2_000.0)
    }

    fn fixture() -> (TestService, MemoryStore, RecordingNotifier) {
        let store = MemoryStore::seeded();
        let notifier = RecordingNotifier::default();
        (service(store.clone(), notifier.clone()), store, notifier)
    }

    fn campus_request(vehicle: &str) -> CreateRideRequest {
        CreateRideRequest {
            pickup: Some("Main Gate".into()),
            destination: Some("Hostel 5".into()),
            vehicle_type: Some(vehicle.into()),
            campus_pickup: Some(CampusRef { location_id: MAIN_GATE }),
            campus_destination: Some(CampusRef { location_id: HOSTEL_5 }),
        }
    }

    fn address_request() -> CreateRideRequest {
        CreateRideRequest {
            pickup: Some("Powai Plaza".into()),
            destination: Some("Hiranandani Hospital".into()),
            vehicle_type: Some("car".into()),
            ..Default::default()
        }
    }

    async fn accepted_ride(svc: &TestService) -> RideWithOtp {
        let created = svc.create(RIDER, &campus_request("auto")).await.unwrap();
        svc.confirm(created.ride.id, CAPTAIN_A).await.unwrap();
        created
    }

    // -- create --

    #[tokio::test]
    async fn campus_ride_from_main_gate_to_hostel_5_is_priced_locally() {
        let (svc, store, _) = fixture();
        let created = svc.create(RIDER, &campus_request("auto")).await.unwrap();

        let a = store.campus_point(MAIN_GATE);
        let b = store.campus_point(HOSTEL_5);
        let expected = campus_quote(&a.coordinates, &b.coordinates).unwrap();
        assert_eq!(created.ride.fare, expected.quote.auto);
        assert_eq!(created.ride.fare, 19);
        assert_eq!(created.ride.status, RideStatus::Pending);
        assert!(created.ride.is_campus());
        assert_eq!(created.ride.pickup, "Main Gate");
        assert_eq!(svc.maps.calls(), 0, "campus rides never reach the provider");
    }

    #[tokio::test]
    async fn otp_is_generated_server_side() {
        let (svc, _, _) = fixture();
        let body = serde_json::json!({
            "pickup": "Main Gate",
            "destination": "Hostel 5",
            "vehicleType": "moto",
            "campusPickup": {"locationId": MAIN_GATE},
            "campusDestination": {"locationId": HOSTEL_5},
            "otp": "012345"
        });
        let req: CreateRideRequest = serde_json::from_value(body).unwrap();
        let created = svc.create(RIDER, &req).await.unwrap();
        assert!(is_well_formed(&created.otp));
        assert_ne!(created.otp, "012345");
    }

    #[tokio::test]
    async fn missing_fields_are_validation_errors() {
        let (svc, store, _) = fixture();
        let mut req = campus_request("auto");
        req.pickup = Some("   ".into());
        assert_matches!(
            svc.create(RIDER, &req).await,
            Err(AppError::Core(CoreError::Validation(_)))
        );

        let mut req = campus_request("auto");
        req.vehicle_type = None;
        assert_matches!(
            svc.create(RIDER, &req).await,
            Err(AppError::Core(CoreError::Validation(_)))
        );

        let req = campus_request("rickshaw");
        assert_matches!(
            svc.create(RIDER, &req).await,
            Err(AppError::Core(CoreError::Validation(_)))
        );
        assert_eq!(store.ride_count(), 0);
    }

    #[tokio::test]
    async fn address_ride_uses_provider_and_external_rates() {
        let (svc, _, notifier) = fixture();
        let created = svc.create(RIDER, &address_request()).await.unwrap();
        // FakeMaps routes are 5 km / 12 min: 50 + 5*15 + 12*3.
        assert_eq!(created.ride.fare, 161);
        assert!(!created.ride.is_campus());
        assert_eq!(svc.maps.calls(), 3);
        assert!(notifier.sent().is_empty(), "only campus rides are dispatched");
    }

    #[tokio::test]
    async fn unresolvable_address_creates_nothing() {
        let store = MemoryStore::seeded();
        let svc = RideService::new(
            store.clone(),
            RecordingNotifier::default(),
            Arc::new(FakeMaps::unresolvable("Nowhere")),
            2_000.0,
        );
        let mut req = address_request();
        req.destination = Some("Nowhere".into());

        assert_matches!(
            svc.create(RIDER, &req).await,
            Err(AppError::Core(CoreError::LocationResolution(_)))
        );
        assert_eq!(store.ride_count(), 0);
    }

    #[tokio::test]
    async fn single_campus_reference_falls_back_to_addresses() {
        let (svc, _, _) = fixture();
        let mut req = campus_request("auto");
        req.campus_destination = None;
        let created = svc.create(RIDER, &req).await.unwrap();
        assert!(!created.ride.is_campus());
        assert!(svc.maps.calls() > 0);
    }

    #[tokio::test]
    async fn unknown_campus_location_is_not_found() {
        let (svc, _, _) = fixture();
        let mut req = campus_request("auto");
        req.campus_pickup = Some(CampusRef { location_id: 999 });
        assert_matches!(
            svc.create(RIDER, &req).await,
            Err(AppError::Core(CoreError::NotFound {
                entity: "CampusLocation",
                id: 999
            }))
        );
    }

    #[tokio::test]
    async fn campus_ride_is_pushed_to_every_connected_captain() {
        let (svc, store, notifier) = fixture();
        store.connect_captain(CAPTAIN_A, "sock-a");
        store.connect_captain(CAPTAIN_B, "sock-b");

        let created = svc.create(RIDER, &campus_request("auto")).await.unwrap();

        let sent = notifier.sent();
        let mut handles: Vec<_> = sent.iter().map(|(h, _)| h.as_str()).collect();
        handles.sort();
        assert_eq!(handles, vec!["sock-a", "sock-b"]);
        for (_, event) in &sent {
            let ServerEvent::NewRide(new_ride) = event else {
                panic!("expected new-ride, got {}", event.name());
            };
            assert_eq!(new_ride.ride_id, created.ride.id);
            assert_eq!(new_ride.otp, created.otp);
            assert_eq!(new_ride.fare, created.ride.fare);
            assert_eq!(new_ride.user.id, RIDER);
        }
    }

    #[tokio::test]
    async fn one_stale_captain_does_not_block_the_others() {
        let (svc, store, notifier) = fixture();
        store.connect_captain(CAPTAIN_A, "sock-a");
        store.connect_captain(CAPTAIN_B, "sock-b");
        store.connect_captain(CAPTAIN_C, "sock-c");
        notifier.fail_handle("sock-b");

        let created = svc.create(RIDER, &campus_request("car")).await;

        assert!(created.is_ok());
        let mut handles: Vec<_> = notifier.sent().into_iter().map(|(h, _)| h).collect();
        handles.sort();
        assert_eq!(handles, vec!["sock-a".to_string(), "sock-c".to_string()]);
    }

    #[tokio::test]
    async fn inactive_captains_are_not_dispatched() {
        let (svc, store, notifier) = fixture();
        store.connect_captain(CAPTAIN_A, "sock-a");
        store.disconnect_captain(CAPTAIN_A);
        svc.create(RIDER, &campus_request("auto")).await.unwrap();
        assert!(notifier.sent().is_empty());
    }

    // -- fare quote --

    #[tokio::test]
    async fn fare_quote_for_campus_ids_matches_created_fare() {
        let (svc, _, _) = fixture();
        let quote = svc
            .fare_quote(&FareQuery {
                campus_pickup_id: Some(MAIN_GATE),
                campus_destination_id: Some(HOSTEL_5),
                ..Default::default()
            })
            .await
            .unwrap();
        let created = svc.create(RIDER, &campus_request("car")).await.unwrap();
        assert_eq!(quote.car, created.ride.fare);
    }

    #[tokio::test]
    async fn fare_quote_for_addresses_uses_distance_provider() {
        let (svc, _, _) = fixture();
        let quote = svc
            .fare_quote(&FareQuery {
                pickup: Some("Powai Plaza".into()),
                destination: Some("IIT Main Gate".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(quote, FareQuote { auto: 104, car: 161, moto: 78 });
        assert_eq!(svc.maps.calls(), 1);
    }

    #[tokio::test]
    async fn fare_quote_requires_both_addresses() {
        let (svc, _, _) = fixture();
        let result = svc
            .fare_quote(&FareQuery {
                pickup: Some("Powai Plaza".into()),
                ..Default::default()
            })
            .await;
        assert_matches!(result, Err(AppError::Core(CoreError::Validation(_))));
    }

    // -- confirm --

    #[tokio::test]
    async fn confirm_assigns_captain_and_sends_otp_to_rider() {
        let (svc, store, notifier) = fixture();
        store.connect_rider(RIDER, "rider-sock");
        let created = svc.create(RIDER, &campus_request("auto")).await.unwrap();

        let ride = svc.confirm(created.ride.id, CAPTAIN_A).await.unwrap();
        assert_eq!(ride.status, RideStatus::Accepted);
        assert_eq!(ride.captain_id, Some(CAPTAIN_A));

        let to_rider = notifier.sent_to("rider-sock");
        assert_eq!(to_rider.len(), 1);
        let ServerEvent::RideConfirmed(confirmed) = &to_rider[0] else {
            panic!("expected ride-confirmed");
        };
        assert_eq!(confirmed.otp, created.otp);
        assert_eq!(confirmed.captain.id, CAPTAIN_A);
    }

    #[tokio::test]
    async fn concurrent_confirmations_have_exactly_one_winner() {
        let (svc, store, _) = fixture();
        let created = svc.create(RIDER, &campus_request("auto")).await.unwrap();
        let id = created.ride.id;

        let (a, b) = tokio::join!(svc.confirm(id, CAPTAIN_A), svc.confirm(id, CAPTAIN_B));

        let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        let loser = if a.is_ok() { b } else { a };
        assert_matches!(loser, Err(AppError::Core(CoreError::Conflict(_))));

        let ride = store.ride(id);
        assert_eq!(ride.status, RideStatus::Accepted);
        assert!(ride.captain_id == Some(CAPTAIN_A) || ride.captain_id == Some(CAPTAIN_B));
    }

    #[tokio::test]
    async fn confirm_unknown_ride_is_not_found() {
        let (svc, _, _) = fixture();
        assert_matches!(
            svc.confirm(404, CAPTAIN_A).await,
            Err(AppError::Core(CoreError::NotFound { entity: "Ride", .. }))
        );
    }

    // -- start --

    #[tokio::test]
    async fn start_with_correct_otp_moves_to_ongoing() {
        let (svc, store, notifier) = fixture();
        store.connect_rider(RIDER, "rider-sock");
        let created = accepted_ride(&svc).await;

        let ride = svc.start(created.ride.id, CAPTAIN_A, Some(&created.otp)).await.unwrap();
        assert_eq!(ride.status, RideStatus::Ongoing);
        assert_matches!(
            notifier.sent_to("rider-sock").last(),
            Some(ServerEvent::RideStarted(RideStatusChange {
                status: RideStatus::Ongoing,
                ..
            }))
        );
    }

    #[tokio::test]
    async fn wrong_otp_leaves_ride_accepted() {
        let (svc, store, _) = fixture();
        let created = accepted_ride(&svc).await;
        let wrong = if created.otp == "999999" { "111111" } else { "999999" };

        assert_matches!(
            svc.start(created.ride.id, CAPTAIN_A, Some(wrong)).await,
            Err(AppError::Core(CoreError::Forbidden(_)))
        );
        assert_eq!(store.ride(created.ride.id).status, RideStatus::Accepted);
    }

    #[tokio::test]
    async fn start_requires_otp() {
        let (svc, _, _) = fixture();
        let created = accepted_ride(&svc).await;
        assert_matches!(
            svc.start(created.ride.id, CAPTAIN_A, None).await,
            Err(AppError::Core(CoreError::Validation(_)))
        );
    }

    #[tokio::test]
    async fn start_by_another_captain_is_forbidden() {
        let (svc, store, _) = fixture();
        let created = accepted_ride(&svc).await;
        assert_matches!(
            svc.start(created.ride.id, CAPTAIN_B, Some(&created.otp)).await,
            Err(AppError::Core(CoreError::Forbidden(_)))
        );
        assert_eq!(store.ride(created.ride.id).status, RideStatus::Accepted);
    }

    #[tokio::test]
    async fn start_outside_accepted_never_mutates() {
        let (svc, store, _) = fixture();

        // pending
        let pending = svc.create(RIDER, &campus_request("auto")).await.unwrap();
        assert_matches!(
            svc.start(pending.ride.id, CAPTAIN_A, Some(&pending.otp)).await,
            Err(AppError::Core(CoreError::Conflict(_)))
        );
        assert_eq!(store.ride(pending.ride.id).status, RideStatus::Pending);

        // ongoing, then completed
        let ride = accepted_ride(&svc).await;
        svc.start(ride.ride.id, CAPTAIN_A, Some(&ride.otp)).await.unwrap();
        for expected in [RideStatus::Ongoing, RideStatus::Completed] {
            assert_matches!(
                svc.start(ride.ride.id, CAPTAIN_A, Some(&ride.otp)).await,
                Err(AppError::Core(CoreError::Conflict(_)))
            );
            assert_eq!(store.ride(ride.ride.id).status, expected);
            if expected == RideStatus::Ongoing {
                svc.end(ride.ride.id, CAPTAIN_A).await.unwrap();
            }
        }

        // cancelled
        let cancelled = svc.create(RIDER, &campus_request("auto")).await.unwrap();
        svc.cancel(cancelled.ride.id, RIDER).await.unwrap();
        assert_matches!(
            svc.start(cancelled.ride.id, CAPTAIN_A, Some(&cancelled.otp)).await,
            Err(AppError::Core(CoreError::Conflict(_)))
        );
        assert_eq!(store.ride(cancelled.ride.id).status, RideStatus::Cancelled);
    }

    // -- end --

    #[tokio::test]
    async fn end_completes_and_keeps_fare() {
        let (svc, store, notifier) = fixture();
        store.connect_rider(RIDER, "rider-sock");
        let created = accepted_ride(&svc).await;
        svc.start(created.ride.id, CAPTAIN_A, Some(&created.otp)).await.unwrap();

        let ride = svc.end(created.ride.id, CAPTAIN_A).await.unwrap();
        assert_eq!(ride.status, RideStatus::Completed);
        assert_eq!(ride.fare, created.ride.fare);
        assert_matches!(
            notifier.sent_to("rider-sock").last(),
            Some(ServerEvent::RideCompleted(_))
        );
    }

    #[tokio::test]
    async fn end_by_other_captain_is_not_found() {
        let (svc, _, _) = fixture();
        let created = accepted_ride(&svc).await;
        svc.start(created.ride.id, CAPTAIN_A, Some(&created.otp)).await.unwrap();
        assert_matches!(
            svc.end(created.ride.id, CAPTAIN_B).await,
            Err(AppError::Core(CoreError::NotFound { .. }))
        );
    }

    #[tokio::test]
    async fn end_before_start_is_conflict() {
        let (svc, _, _) = fixture();
        let created = accepted_ride(&svc).await;
        assert_matches!(
            svc.end(created.ride.id, CAPTAIN_A).await,
            Err(AppError::Core(CoreError::Conflict(_)))
        );
    }

    // -- cancel --

    #[tokio::test]
    async fn cancel_pending_and_accepted_rides() {
        let (svc, store, notifier) = fixture();
        store.connect_captain(CAPTAIN_A, "sock-a");

        let pending = svc.create(RIDER, &campus_request("auto")).await.unwrap();
        let ride = svc.cancel(pending.ride.id, RIDER).await.unwrap();
        assert_eq!(ride.status, RideStatus::Cancelled);

        let accepted = accepted_ride(&svc).await;
        notifier.clear();
        svc.cancel(accepted.ride.id, RIDER).await.unwrap();
        assert_matches!(
            notifier.sent_to("sock-a").as_slice(),
            [ServerEvent::RideCancelled(RideCancelled { message, .. })] if message == "Cancelled by user"
        );
    }

    #[tokio::test]
    async fn cancel_after_start_fails_and_leaves_status() {
        let (svc, store, _) = fixture();
        let created = accepted_ride(&svc).await;
        svc.start(created.ride.id, CAPTAIN_A, Some(&created.otp)).await.unwrap();

        assert_matches!(
            svc.cancel(created.ride.id, RIDER).await,
            Err(AppError::Core(CoreError::Conflict(_)))
        );
        assert_eq!(store.ride(created.ride.id).status, RideStatus::Ongoing);
    }

    #[tokio::test]
    async fn cancel_someone_elses_ride_is_not_found() {
        let (svc, _, _) = fixture();
        let created = svc.create(RIDER, &campus_request("auto")).await.unwrap();
        assert_matches!(
            svc.cancel(created.ride.id, RIDER + 1).await,
            Err(AppError::Core(CoreError::NotFound { .. }))
        );
    }

    // -- reads --

    #[tokio::test]
    async fn pending_rides_never_expire() {
        let (svc, store, _) = fixture();
        let created = svc.create(RIDER, &campus_request("auto")).await.unwrap();
        store.age_ride(created.ride.id, chrono::Duration::days(30));

        let pending = svc.pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].status, RideStatus::Pending);
        assert!(svc.confirm(created.ride.id, CAPTAIN_A).await.is_ok());
    }

    #[tokio::test]
    async fn ride_is_visible_only_to_participants() {
        let (svc, _, _) = fixture();
        let created = accepted_ride(&svc).await;
        let id = created.ride.id;

        assert!(svc.ride_for(id, Participant::rider(RIDER)).await.is_ok());
        assert!(svc.ride_for(id, Participant::captain(CAPTAIN_A)).await.is_ok());
        assert_matches!(
            svc.ride_for(id, Participant::captain(CAPTAIN_B)).await,
            Err(AppError::Core(CoreError::NotFound { .. }))
        );
        assert_matches!(
            svc.ride_for(id, Participant::rider(RIDER + 1)).await,
            Err(AppError::Core(CoreError::NotFound { .. }))
        );
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let (svc, _, _) = fixture();
        let first = svc.create(RIDER, &campus_request("auto")).await.unwrap();
        let second = svc.create(RIDER, &campus_request("car")).await.unwrap();
        let ids: Vec<_> = svc.history(RIDER).await.unwrap().iter().map(|e| e.ride.id).collect();
        assert_eq!(ids, vec![second.ride.id, first.ride.id]);
    }

    #[tokio::test]
    async fn history_shows_captain_once_confirmed() {
        let (svc, _, _) = fixture();
        let pending = svc.create(RIDER, &campus_request("car")).await.unwrap();
        let accepted = accepted_ride(&svc).await;

        let history = svc.history(RIDER).await.unwrap();
        let entry = |id: DbId| history.iter().find(|e| e.ride.id == id).unwrap();
        assert!(entry(pending.ride.id).captain.is_none());

        let json = serde_json::to_value(entry(accepted.ride.id)).unwrap();
        assert_eq!(json["id"], accepted.ride.id);
        assert_eq!(json["captain"]["id"], CAPTAIN_A);
        assert_eq!(json["captain"]["firstName"], format!("Captain{CAPTAIN_A}"));
        assert_eq!(json["captain"]["vehicle"]["plate"], format!("MH01AB{CAPTAIN_A:04}"));
        assert!(json.get("otp").is_none());
    }

    // -- nearby captains --

    #[tokio::test]
    async fn nearby_captains_enforces_radius() {
        let (svc, store, _) = fixture();
        store.connect_captain(CAPTAIN_A, "sock-a");
        store.place_captain(CAPTAIN_A, Coordinates::new(19.1305, 72.916));
        store.connect_captain(CAPTAIN_B, "sock-b");
        store.place_captain(CAPTAIN_B, Coordinates::new(19.2, 72.9));

        let result = svc
            .nearby_captains(Coordinates::new(19.1336, 72.9153), Some(1_000.0))
            .await
            .unwrap();
        assert!(result.radius_enforced);
        let ids: Vec<_> = result.captains.iter().map(|c| c.captain.id).collect();
        assert_eq!(ids, vec![CAPTAIN_A]);
    }

    #[tokio::test]
    async fn nearby_captains_fallback_is_flagged() {
        let (svc, store, _) = fixture();
        store.connect_captain(CAPTAIN_A, "sock-a");
        store.place_captain(CAPTAIN_A, Coordinates::new(19.1305, 72.916));
        store.connect_captain(CAPTAIN_B, "sock-b");
        store.place_captain(CAPTAIN_B, Coordinates::new(19.2, 72.9));
        store.break_spatial_index();

        let result = svc
            .nearby_captains(Coordinates::new(19.1336, 72.9153), Some(1_000.0))
            .await
            .unwrap();
        assert!(!result.radius_enforced);
        assert_eq!(result.captains.len(), 2);
        assert!(result.captains.iter().all(|c| c.distance_m.is_none()));
    }

    #[tokio::test]
    async fn nearby_captains_rejects_bad_input() {
        let (svc, _, _) = fixture();
        assert_matches!(
            svc.nearby_captains(Coordinates::new(95.0, 0.0), None).await,
            Err(AppError::Core(CoreError::Validation(_)))
        );
        assert_matches!(
            svc.nearby_captains(Coordinates::new(19.0, 72.0), Some(-5.0)).await,
            Err(AppError::Core(CoreError::Validation(_)))
        );
    }
}
