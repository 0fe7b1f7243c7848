//! Ride lifecycle state machine and ride endpoint representation.
//!
//! ```text
//! pending ──confirm──▶ accepted ──start(otp)──▶ ongoing ──end──▶ completed
//!    │                     │
//!    └──────cancel─────────┴──────────────▶ cancelled
//! ```
//!
//! Status ids match the seed order of the `ride_statuses` lookup table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::campus::LocationCategory;
use crate::error::CoreError;
use crate::geo::Coordinates;
use crate::types::DbId;

/// Status ID type matching SMALLINT lookup tables in the database.
pub type StatusId = i16;

// ---------------------------------------------------------------------------
// RideStatus
// ---------------------------------------------------------------------------

#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    Pending = 1,
    Accepted = 2,
    Ongoing = 3,
    Completed = 4,
    Cancelled = 5,
}

impl RideStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// A rider may cancel only before the ride has started.
    pub fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }

    /// Whether `self -> next` is a legal lifecycle step.
    pub fn can_transition_to(self, next: RideStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted)
                | (Self::Accepted, Self::Ongoing)
                | (Self::Ongoing, Self::Completed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Accepted, Self::Cancelled)
        )
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<StatusId> for RideStatus {
    type Error = CoreError;

    fn try_from(id: StatusId) -> Result<Self, Self::Error> {
        match id {
            1 => Ok(Self::Pending),
            2 => Ok(Self::Accepted),
            3 => Ok(Self::Ongoing),
            4 => Ok(Self::Completed),
            5 => Ok(Self::Cancelled),
            other => Err(CoreError::Internal(format!("unknown ride status id {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// CaptainStatus
// ---------------------------------------------------------------------------

/// Captain availability; flipped by the real-time channel on join/disconnect.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptainStatus {
    Active = 1,
    Inactive = 2,
}

impl CaptainStatus {
    pub fn id(self) -> StatusId {
        self as StatusId
    }
}

impl TryFrom<StatusId> for CaptainStatus {
    type Error = CoreError;

    fn try_from(id: StatusId) -> Result<Self, Self::Error> {
        match id {
            1 => Ok(Self::Active),
            2 => Ok(Self::Inactive),
            other => Err(CoreError::Internal(format!("unknown captain status id {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// Snapshot of a campus location taken when the ride is created.
///
/// Stored on the ride so later edits to the reference data never change
/// a ride's recorded route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampusPoint {
    pub location_id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    pub category: LocationCategory,
    pub coordinates: Coordinates,
}

/// One end of a ride: either a free-text address resolved through the
/// external provider, or a known campus location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Endpoint {
    Address { address: String },
    Campus(CampusPoint),
}

impl Endpoint {
    /// Display text for the endpoint (address or location name).
    pub fn label(&self) -> &str {
        match self {
            Self::Address { address } => address,
            Self::Campus(point) => &point.name,
        }
    }

    pub fn campus(&self) -> Option<&CampusPoint> {
        match self {
            Self::Campus(point) => Some(point),
            Self::Address { .. } => None,
        }
    }
}

/// Reject a blank required text field.
pub fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(())
}
