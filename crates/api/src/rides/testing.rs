//! In-memory doubles for the ride store, notifier and maps provider.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use hopinn_core::campus::{within_radius, LocationCategory};
use hopinn_core::geo::Coordinates;
use hopinn_core::ride::{CampusPoint, CaptainStatus, RideStatus};
use hopinn_core::ride_events::{
    CaptainProfile, ParticipantKind, RiderProfile, ServerEvent, VehicleProfile,
};
use hopinn_core::types::DbId;
use hopinn_core::vehicle::VehicleType;
use hopinn_db::models::captain::NearbyCaptain;
use hopinn_db::models::ride::{CreateRide, Ride, RideWithOtp};
use hopinn_maps::{DistanceTime, GeocodeResult, MapsError, MapsProvider, ValueText};
use sqlx::types::Json;

use super::store::{Contact, PresenceStore, RideStore};
use crate::notifications::{Notifier, NotifyError};
use crate::ws::manager::{ConnectionClosed, Participant};

pub const MAIN_GATE: DbId = 1;
pub const HOSTEL_5: DbId = 2;

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct MemCaptain {
    profile: CaptainProfile,
    socket_id: Option<String>,
    status: CaptainStatus,
    position: Option<Coordinates>,
}

#[derive(Clone)]
struct MemRider {
    profile: RiderProfile,
    socket_id: Option<String>,
}

#[derive(Default)]
struct State {
    next_ride_id: DbId,
    rides: HashMap<DbId, RideWithOtp>,
    riders: HashMap<DbId, MemRider>,
    captains: HashMap<DbId, MemCaptain>,
    campus: HashMap<DbId, CampusPoint>,
    spatial_broken: bool,
}

/// Shared-state store; clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Riders 1 and 2, captains 10 to 12 (inactive, offline), and two
    /// campus locations.
    pub fn seeded() -> Self {
        let store = Self::default();
        {
            let mut s = store.lock();
            for id in [1, 2] {
                s.riders.insert(
                    id,
                    MemRider {
                        profile: RiderProfile {
                            id,
                            first_name: format!("Rider{id}"),
                            last_name: None,
                            email: format!("rider{id}@iitb.ac.in"),
                        },
                        socket_id: None,
                    },
                );
            }
            for id in [10, 11, 12] {
                s.captains.insert(
                    id,
                    MemCaptain {
                        profile: CaptainProfile {
                            id,
                            first_name: format!("Captain{id}"),
                            last_name: None,
                            vehicle: VehicleProfile {
                                color: "Yellow".into(),
                                plate: format!("MH01AB{id:04}"),
                                capacity: 3,
                                vehicle_type: VehicleType::Auto,
                            },
                        },
                        socket_id: None,
                        status: CaptainStatus::Inactive,
                        position: None,
                    },
                );
            }
            s.campus.insert(
                MAIN_GATE,
                CampusPoint {
                    location_id: MAIN_GATE,
                    name: "Main Gate".into(),
                    category: LocationCategory::Gate,
                    coordinates: Coordinates::new(19.133636, 72.915358),
                },
            );
            s.campus.insert(
                HOSTEL_5,
                CampusPoint {
                    location_id: HOSTEL_5,
                    name: "Hostel 5".into(),
                    category: LocationCategory::Hostel,
                    coordinates: Coordinates::new(19.1305, 72.916),
                },
            );
        }
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn campus_point(&self, id: DbId) -> CampusPoint {
        self.lock().campus[&id].clone()
    }

    pub fn ride(&self, id: DbId) -> Ride {
        self.lock().rides[&id].ride.clone()
    }

    pub fn ride_count(&self) -> usize {
        self.lock().rides.len()
    }

    pub fn age_ride(&self, id: DbId, by: chrono::Duration) {
        let mut s = self.lock();
        let ride = &mut s.rides.get_mut(&id).unwrap().ride;
        ride.created_at -= by;
        ride.updated_at -= by;
    }

    pub fn connect_rider(&self, id: DbId, socket: &str) {
        self.lock().riders.get_mut(&id).unwrap().socket_id = Some(socket.to_string());
    }

    pub fn connect_captain(&self, id: DbId, socket: &str) {
        let mut s = self.lock();
        let captain = s.captains.get_mut(&id).unwrap();
        captain.socket_id = Some(socket.to_string());
        captain.status = CaptainStatus::Active;
    }

    pub fn disconnect_captain(&self, id: DbId) {
        let mut s = self.lock();
        let captain = s.captains.get_mut(&id).unwrap();
        captain.socket_id = None;
        captain.status = CaptainStatus::Inactive;
    }

    pub fn place_captain(&self, id: DbId, at: Coordinates) {
        self.lock().captains.get_mut(&id).unwrap().position = Some(at);
    }

    pub fn captain_socket(&self, id: DbId) -> Option<String> {
        self.lock().captains[&id].socket_id.clone()
    }

    pub fn captain_status(&self, id: DbId) -> CaptainStatus {
        self.lock().captains[&id].status
    }

    pub fn captain_position(&self, id: DbId) -> Option<Coordinates> {
        self.lock().captains[&id].position
    }

    pub fn rider_socket(&self, id: DbId) -> Option<String> {
        self.lock().riders[&id].socket_id.clone()
    }

    /// Make `captains_within_radius` fail as if the spatial extension
    /// were missing.
    pub fn break_spatial_index(&self) {
        self.lock().spatial_broken = true;
    }

    /// Apply `next` when `guard` holds, returning the updated ride.
    fn transition<F>(&self, id: DbId, next: RideStatus, guard: F) -> Option<RideWithOtp>
    where
        F: FnOnce(&RideWithOtp) -> bool,
    {
        let mut s = self.lock();
        let entry = s.rides.get_mut(&id)?;
        if !guard(entry) {
            return None;
        }
        entry.ride.status = next;
        entry.ride.updated_at = Utc::now();
        Some(entry.clone())
    }
}

fn sorted_newest_first(mut rides: Vec<Ride>) -> Vec<Ride> {
    rides.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    rides
}

impl RideStore for MemoryStore {
    async fn insert_ride(&self, input: &CreateRide) -> Result<RideWithOtp, sqlx::Error> {
        let mut s = self.lock();
        s.next_ride_id += 1;
        let id = s.next_ride_id;
        let now = Utc::now();
        let (campus_pickup, campus_destination) = match input.campus_snapshots() {
            Some((p, d)) => (Some(Json(p)), Some(Json(d))),
            None => (None, None),
        };
        let row = RideWithOtp {
            ride: Ride {
                id,
                rider_id: input.rider_id,
                captain_id: None,
                pickup: input.pickup.label().to_string(),
                destination: input.destination.label().to_string(),
                campus_pickup,
                campus_destination,
                fare: input.fare,
                vehicle_type: input.vehicle_type,
                status: RideStatus::Pending,
                distance_m: Some(input.distance_m),
                duration_s: Some(input.duration_s),
                created_at: now,
                updated_at: now,
            },
            otp: input.otp.clone(),
        };
        s.rides.insert(id, row.clone());
        Ok(row)
    }

    async fn find_ride(&self, id: DbId) -> Result<Option<Ride>, sqlx::Error> {
        Ok(self.lock().rides.get(&id).map(|r| r.ride.clone()))
    }

    async fn find_ride_with_otp(&self, id: DbId) -> Result<Option<RideWithOtp>, sqlx::Error> {
        Ok(self.lock().rides.get(&id).cloned())
    }

    async fn accept_ride(&self, id: DbId, captain_id: DbId) -> Result<Option<RideWithOtp>, sqlx::Error> {
        let mut s = self.lock();
        let Some(entry) = s.rides.get_mut(&id) else {
            return Ok(None);
        };
        if entry.ride.status != RideStatus::Pending || entry.ride.captain_id.is_some() {
            return Ok(None);
        }
        entry.ride.status = RideStatus::Accepted;
        entry.ride.captain_id = Some(captain_id);
        entry.ride.updated_at = Utc::now();
        Ok(Some(entry.clone()))
    }

    async fn start_ride(&self, id: DbId, captain_id: DbId, otp: &str) -> Result<Option<Ride>, sqlx::Error> {
        Ok(self
            .transition(id, RideStatus::Ongoing, |r| {
                r.ride.status == RideStatus::Accepted && r.ride.captain_id == Some(captain_id) && r.otp == otp
            })
            .map(|r| r.ride))
    }

    async fn complete_ride(&self, id: DbId, captain_id: DbId) -> Result<Option<Ride>, sqlx::Error> {
        Ok(self
            .transition(id, RideStatus::Completed, |r| {
                r.ride.status == RideStatus::Ongoing && r.ride.captain_id == Some(captain_id)
            })
            .map(|r| r.ride))
    }

    async fn cancel_ride(&self, id: DbId, rider_id: DbId) -> Result<Option<Ride>, sqlx::Error> {
        Ok(self
            .transition(id, RideStatus::Cancelled, |r| {
                r.ride.status.is_cancellable() && r.ride.rider_id == rider_id
            })
            .map(|r| r.ride))
    }

    async fn rides_for_rider(&self, rider_id: DbId) -> Result<Vec<Ride>, sqlx::Error> {
        let rides = self
            .lock()
            .rides
            .values()
            .filter(|r| r.ride.rider_id == rider_id)
            .map(|r| r.ride.clone())
            .collect();
        Ok(sorted_newest_first(rides))
    }

    async fn pending_rides(&self, limit: i64) -> Result<Vec<Ride>, sqlx::Error> {
        let rides = self
            .lock()
            .rides
            .values()
            .filter(|r| r.ride.status == RideStatus::Pending)
            .map(|r| r.ride.clone())
            .collect();
        let mut rides = sorted_newest_first(rides);
        rides.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rides)
    }

    async fn rider(&self, id: DbId) -> Result<Option<Contact<RiderProfile>>, sqlx::Error> {
        Ok(self.lock().riders.get(&id).map(|r| Contact {
            profile: r.profile.clone(),
            socket_id: r.socket_id.clone(),
        }))
    }

    async fn captain(&self, id: DbId) -> Result<Option<Contact<CaptainProfile>>, sqlx::Error> {
        Ok(self.lock().captains.get(&id).map(|c| Contact {
            profile: c.profile.clone(),
            socket_id: c.socket_id.clone(),
        }))
    }

    async fn campus_location(&self, id: DbId) -> Result<Option<CampusPoint>, sqlx::Error> {
        Ok(self.lock().campus.get(&id).cloned())
    }

    async fn dispatch_targets(&self) -> Result<Vec<Contact<CaptainProfile>>, sqlx::Error> {
        Ok(self
            .lock()
            .captains
            .values()
            .filter(|c| c.status == CaptainStatus::Active && c.socket_id.is_some())
            .map(|c| Contact {
                profile: c.profile.clone(),
                socket_id: c.socket_id.clone(),
            })
            .collect())
    }

    async fn captains_within_radius(&self, center: Coordinates, radius_m: f64) -> Result<Vec<NearbyCaptain>, sqlx::Error> {
        let s = self.lock();
        if s.spatial_broken {
            return Err(sqlx::Error::Protocol("function ll_to_earth does not exist".into()));
        }
        let candidates: Vec<&MemCaptain> = s
            .captains
            .values()
            .filter(|c| c.status == CaptainStatus::Active && c.socket_id.is_some() && c.position.is_some())
            .collect();
        Ok(within_radius(candidates, &center, radius_m, |c| c.position.unwrap_or(center))
            .into_iter()
            .map(|(c, d)| NearbyCaptain {
                captain: c.profile.clone(),
                location: c.position,
                distance_m: Some(d),
            })
            .collect())
    }

    async fn active_captains_with_legacy_position(&self) -> Result<Vec<NearbyCaptain>, sqlx::Error> {
        Ok(self
            .lock()
            .captains
            .values()
            .filter(|c| c.status == CaptainStatus::Active && c.position.is_some())
            .map(|c| NearbyCaptain {
                captain: c.profile.clone(),
                location: c.position,
                distance_m: None,
            })
            .collect())
    }
}

impl PresenceStore for MemoryStore {
    async fn attach(&self, participant: Participant, socket_id: &str) -> Result<bool, sqlx::Error> {
        let mut s = self.lock();
        Ok(match participant.kind {
            ParticipantKind::Rider => match s.riders.get_mut(&participant.id) {
                Some(r) => {
                    r.socket_id = Some(socket_id.to_string());
                    true
                }
                None => false,
            },
            ParticipantKind::Captain => match s.captains.get_mut(&participant.id) {
                Some(c) => {
                    c.socket_id = Some(socket_id.to_string());
                    c.status = CaptainStatus::Active;
                    true
                }
                None => false,
            },
        })
    }

    async fn detach(&self, participant: Participant, socket_id: &str) -> Result<bool, sqlx::Error> {
        let mut s = self.lock();
        Ok(match participant.kind {
            ParticipantKind::Rider => match s.riders.get_mut(&participant.id) {
                Some(r) if r.socket_id.as_deref() == Some(socket_id) => {
                    r.socket_id = None;
                    true
                }
                _ => false,
            },
            ParticipantKind::Captain => match s.captains.get_mut(&participant.id) {
                Some(c) if c.socket_id.as_deref() == Some(socket_id) => {
                    c.socket_id = None;
                    c.status = CaptainStatus::Inactive;
                    true
                }
                _ => false,
            },
        })
    }

    async fn update_captain_position(&self, captain_id: DbId, at: Coordinates) -> Result<bool, sqlx::Error> {
        Ok(match self.lock().captains.get_mut(&captain_id) {
            Some(c) => {
                c.position = Some(at);
                true
            }
            None => false,
        })
    }
}

// ---------------------------------------------------------------------------
// RecordingNotifier
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Outbox {
    sent: Vec<(String, ServerEvent)>,
    failing: HashSet<String>,
}

/// Records every delivered event. Handles marked with
/// [`fail_handle`](Self::fail_handle) fail as if their socket had closed.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    outbox: Arc<Mutex<Outbox>>,
}

impl RecordingNotifier {
    pub fn fail_handle(&self, handle: &str) {
        self.outbox.lock().unwrap().failing.insert(handle.to_string());
    }

    pub fn sent(&self) -> Vec<(String, ServerEvent)> {
        self.outbox.lock().unwrap().sent.clone()
    }

    pub fn sent_to(&self, handle: &str) -> Vec<ServerEvent> {
        self.outbox
            .lock()
            .unwrap()
            .sent
            .iter()
            .filter(|(h, _)| h == handle)
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.outbox.lock().unwrap().sent.clear();
    }
}

impl Notifier for RecordingNotifier {
    async fn send(&self, handle: &str, event: &ServerEvent) -> Result<bool, NotifyError> {
        let mut outbox = self.outbox.lock().unwrap();
        if outbox.failing.contains(handle) {
            return Err(ConnectionClosed(handle.to_string()).into());
        }
        outbox.sent.push((handle.to_string(), event.clone()));
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// FakeMaps
// ---------------------------------------------------------------------------

/// Every address geocodes to the campus centre and every route is 5 km /
/// 12 minutes, except addresses listed as unresolvable.
#[derive(Default)]
pub struct FakeMaps {
    unresolvable: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeMaps {
    pub fn unresolvable(address: &str) -> Self {
        Self {
            unresolvable: HashSet::from([address.to_string()]),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, address: &str) -> Result<(), MapsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unresolvable.contains(address) {
            return Err(MapsError::NoResults(address.to_string()));
        }
        Ok(())
    }
}

impl MapsProvider for FakeMaps {
    async fn geocode(&self, address: &str) -> Result<GeocodeResult, MapsError> {
        self.check(address)?;
        Ok(GeocodeResult {
            ltd: 19.1334,
            lng: 72.9133,
            formatted_address: address.to_string(),
        })
    }

    async fn distance_time(&self, origin: &str, destination: &str) -> Result<DistanceTime, MapsError> {
        self.check(origin)?;
        if self.unresolvable.contains(destination) {
            return Err(MapsError::NoResults(destination.to_string()));
        }
        Ok(DistanceTime {
            distance: ValueText {
                text: "5.0 km".into(),
                value: 5_000.0,
            },
            duration: ValueText {
                text: "12 mins".into(),
                value: 720.0,
            },
        })
    }

    async fn suggestions(&self, input: &str) -> Result<Vec<String>, MapsError> {
        self.check(input)?;
        Ok(vec![format!("{input} Road"), format!("{input} Lake")])
    }
}
