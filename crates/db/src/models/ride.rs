//! Ride model and DTOs.

use hopinn_core::fare::PricedTrip;
use hopinn_core::ride::{CampusPoint, Endpoint, RideStatus};
use hopinn_core::types::{DbId, Timestamp};
use hopinn_core::vehicle::VehicleType;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A ride row without its OTP. This is the shape every read returns
/// unless the caller explicitly asks for [`RideWithOtp`].
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    pub id: DbId,
    pub rider_id: DbId,
    pub captain_id: Option<DbId>,
    pub pickup: String,
    pub destination: String,
    pub campus_pickup: Option<Json<CampusPoint>>,
    pub campus_destination: Option<Json<CampusPoint>>,
    pub fare: i64,
    #[sqlx(try_from = "String")]
    pub vehicle_type: VehicleType,
    #[sqlx(rename = "status_id", try_from = "i16")]
    pub status: RideStatus,
    #[serde(rename = "distance")]
    pub distance_m: Option<f64>,
    #[serde(rename = "duration")]
    pub duration_s: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Ride {
    /// Whether both endpoints were resolved to campus locations.
    pub fn is_campus(&self) -> bool {
        self.campus_pickup.is_some() && self.campus_destination.is_some()
    }

    pub fn pickup_endpoint(&self) -> Endpoint {
        endpoint(&self.pickup, self.campus_pickup.as_ref())
    }

    pub fn destination_endpoint(&self) -> Endpoint {
        endpoint(&self.destination, self.campus_destination.as_ref())
    }
}

fn endpoint(text: &str, campus: Option<&Json<CampusPoint>>) -> Endpoint {
    match campus {
        Some(Json(point)) => Endpoint::Campus(point.clone()),
        None => Endpoint::Address {
            address: text.to_string(),
        },
    }
}

/// A ride together with its OTP.
///
/// Returned only to the rider at creation and internally for OTP checks
/// and the captain confirmation event.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct RideWithOtp {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub ride: Ride,
    pub otp: String,
}

/// DTO for inserting a ride. The fare and OTP are computed server-side
/// before this is built.
#[derive(Debug, Clone)]
pub struct CreateRide {
    pub rider_id: DbId,
    pub pickup: Endpoint,
    pub destination: Endpoint,
    pub vehicle_type: VehicleType,
    pub fare: i64,
    pub distance_m: f64,
    pub duration_s: f64,
    pub otp: String,
}

impl CreateRide {
    pub fn new(
        rider_id: DbId,
        pickup: Endpoint,
        destination: Endpoint,
        vehicle_type: VehicleType,
        priced: &PricedTrip,
        otp: String,
    ) -> Self {
        Self {
            rider_id,
            pickup,
            destination,
            vehicle_type,
            fare: priced.quote.for_vehicle(vehicle_type),
            distance_m: priced.trip.distance_m,
            duration_s: priced.trip.duration_s,
            otp,
        }
    }

    /// Campus snapshots, present only when both endpoints are campus points.
    pub fn campus_snapshots(&self) -> Option<(CampusPoint, CampusPoint)> {
        match (self.pickup.campus(), self.destination.campus()) {
            (Some(p), Some(d)) => Some((p.clone(), d.clone())),
            _ => None,
        }
    }
}
