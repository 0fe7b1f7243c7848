//! Captain (driver) account model and DTOs.

use hopinn_core::geo::Coordinates;
use hopinn_core::ride::CaptainStatus;
use hopinn_core::ride_events::{CaptainProfile, VehicleProfile};
use hopinn_core::types::{DbId, Timestamp};
use hopinn_core::vehicle::VehicleType;
use serde::Serialize;
use sqlx::FromRow;

/// Full row from the `captains` table. Contains the password hash.
#[derive(Debug, Clone, FromRow)]
pub struct Captain {
    pub id: DbId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub socket_id: Option<String>,
    #[sqlx(rename = "status_id", try_from = "i16")]
    pub status: CaptainStatus,
    pub vehicle_color: String,
    pub vehicle_plate: String,
    pub vehicle_capacity: i32,
    #[sqlx(try_from = "String")]
    pub vehicle_type: VehicleType,
    pub position_lat: Option<f64>,
    pub position_lng: Option<f64>,
    pub legacy_ltd: Option<f64>,
    pub legacy_lng: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Captain {
    pub fn vehicle(&self) -> VehicleProfile {
        VehicleProfile {
            color: self.vehicle_color.clone(),
            plate: self.vehicle_plate.clone(),
            capacity: self.vehicle_capacity,
            vehicle_type: self.vehicle_type,
        }
    }

    pub fn profile(&self) -> CaptainProfile {
        CaptainProfile {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            vehicle: self.vehicle(),
        }
    }

    /// Last indexed position, if the captain has reported one.
    pub fn position(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.position_lat?, self.position_lng?))
    }
}

/// Safe captain representation for API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptainResponse {
    pub id: DbId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub status: CaptainStatus,
    pub vehicle: VehicleProfile,
    pub location: Option<Coordinates>,
    pub created_at: Timestamp,
}

impl From<Captain> for CaptainResponse {
    fn from(captain: Captain) -> Self {
        Self {
            vehicle: captain.vehicle(),
            location: captain.position(),
            id: captain.id,
            first_name: captain.first_name,
            last_name: captain.last_name,
            email: captain.email,
            status: captain.status,
            created_at: captain.created_at,
        }
    }
}

/// DTO for creating a captain. The password is already hashed.
#[derive(Debug, Clone)]
pub struct CreateCaptain {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub vehicle_color: String,
    pub vehicle_plate: String,
    pub vehicle_capacity: i32,
    pub vehicle_type: VehicleType,
}

/// A captain returned by a proximity query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyCaptain {
    #[serde(flatten)]
    pub captain: CaptainProfile,
    pub location: Option<Coordinates>,
    /// Distance from the query centre; absent on the unfiltered fallback path.
    pub distance_m: Option<f64>,
}

/// Row shape of the radius query: a captain plus its computed distance.
#[derive(Debug, Clone, FromRow)]
pub struct CaptainWithDistance {
    #[sqlx(flatten)]
    pub captain: Captain,
    pub distance_m: f64,
}
