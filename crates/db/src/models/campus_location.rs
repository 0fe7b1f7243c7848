//! Campus reference location model.

use hopinn_core::campus::{LocationCategory, SearchFields};
use hopinn_core::geo::Coordinates;
use hopinn_core::ride::CampusPoint;
use hopinn_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampusLocation {
    pub id: DbId,
    pub name: String,
    #[sqlx(try_from = "String")]
    #[serde(rename = "type")]
    pub category: LocationCategory,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub aliases: Vec<String>,
    pub building_code: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CampusLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn search_fields(&self) -> SearchFields<'_> {
        SearchFields {
            name: &self.name,
            aliases: &self.aliases,
            description: &self.description,
        }
    }

    /// Snapshot stored on a ride.
    pub fn to_point(&self) -> CampusPoint {
        CampusPoint {
            location_id: self.id,
            name: self.name.clone(),
            category: self.category,
            coordinates: self.coordinates(),
        }
    }
}

/// A location annotated with its distance from a query point.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyLocation {
    #[serde(flatten)]
    pub location: CampusLocation,
    pub distance_m: f64,
}
