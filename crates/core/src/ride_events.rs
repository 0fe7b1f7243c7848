//! Real-time event vocabulary exchanged over the WebSocket channel.
//!
//! Every frame is a JSON object `{ "event": <name>, "data": <payload> }`.
//! [`ServerEvent`] covers server-to-client pushes and [`ClientEvent`] the
//! messages a connected client may send.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geo::Coordinates;
use crate::ride::{Endpoint, RideStatus};
use crate::types::DbId;
use crate::vehicle::VehicleType;

pub const EVENT_NEW_RIDE: &str = "new-ride";
pub const EVENT_RIDE_CONFIRMED: &str = "ride-confirmed";
pub const EVENT_RIDE_STARTED: &str = "ride-started";
pub const EVENT_RIDE_COMPLETED: &str = "ride-completed";
pub const EVENT_RIDE_CANCELLED: &str = "ride-cancelled";
pub const EVENT_ERROR: &str = "error";

pub const EVENT_JOIN: &str = "join";
pub const EVENT_UPDATE_LOCATION_CAPTAIN: &str = "update-location-captain";

// ---------------------------------------------------------------------------
// Public profiles
// ---------------------------------------------------------------------------

/// What a captain gets to see about the rider who requested a ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiderProfile {
    pub id: DbId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleProfile {
    pub color: String,
    pub plate: String,
    pub capacity: i32,
    pub vehicle_type: VehicleType,
}

/// What a rider gets to see about the captain who confirmed their ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptainProfile {
    pub id: DbId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub vehicle: VehicleProfile,
}

// ---------------------------------------------------------------------------
// Server -> client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRide {
    pub ride_id: DbId,
    pub user: RiderProfile,
    pub pickup: Endpoint,
    pub destination: Endpoint,
    pub fare: i64,
    pub vehicle_type: VehicleType,
    pub otp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RideConfirmed {
    pub ride_id: DbId,
    pub captain: CaptainProfile,
    pub otp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RideStatusChange {
    pub ride_id: DbId,
    pub status: RideStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RideCancelled {
    pub ride_id: DbId,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    NewRide(NewRide),
    RideConfirmed(RideConfirmed),
    RideStarted(RideStatusChange),
    RideCompleted(RideStatusChange),
    RideCancelled(RideCancelled),
    Error(ErrorPayload),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewRide(_) => EVENT_NEW_RIDE,
            Self::RideConfirmed(_) => EVENT_RIDE_CONFIRMED,
            Self::RideStarted(_) => EVENT_RIDE_STARTED,
            Self::RideCompleted(_) => EVENT_RIDE_COMPLETED,
            Self::RideCancelled(_) => EVENT_RIDE_CANCELLED,
            Self::Error(_) => EVENT_ERROR,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            message: message.into(),
        })
    }

    /// Ride id the event concerns, if any.
    pub fn ride_id(&self) -> Option<DbId> {
        match self {
            Self::NewRide(e) => Some(e.ride_id),
            Self::RideConfirmed(e) => Some(e.ride_id),
            Self::RideStarted(e) | Self::RideCompleted(e) => Some(e.ride_id),
            Self::RideCancelled(e) => Some(e.ride_id),
            Self::Error(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Client -> server
// ---------------------------------------------------------------------------

/// Which directory a joining client belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    #[serde(rename = "user", alias = "rider")]
    Rider,
    Captain,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub user_id: DbId,
    pub user_type: ParticipantKind,
}

/// Position in the legacy `{ltd, lng}` shape clients send.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct LegacyPoint {
    pub ltd: Option<f64>,
    pub lng: Option<f64>,
}

impl LegacyPoint {
    pub fn to_coordinates(self) -> Result<Coordinates, CoreError> {
        match (self.ltd, self.lng) {
            (Some(ltd), Some(lng)) => Coordinates::try_new(ltd, lng),
            _ => Err(CoreError::Validation("Invalid location data".into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    pub user_id: DbId,
    #[serde(default)]
    pub location: Option<LegacyPoint>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    Join(JoinRequest),
    UpdateLocationCaptain(LocationUpdate),
}
