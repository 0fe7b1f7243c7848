//! Great-circle geometry on WGS-84 latitude/longitude pairs.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Mean Earth radius used by the haversine formula, in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point on the Earth's surface in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build validated coordinates: both components finite and in range.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        let coords = Self::new(latitude, longitude);
        coords.validate()?;
        Ok(coords)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CoreError::Validation(format!(
                "latitude must be a finite value in [-90, 90], got {}",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CoreError::Validation(format!(
                "longitude must be a finite value in [-180, 180], got {}",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Haversine distance to `other`, in metres.
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        haversine_m(self, other)
    }
}

/// Great-circle distance between two points using the haversine formula.
pub fn haversine_m(a: &Coordinates, b: &Coordinates) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    EARTH_RADIUS_M * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Validate a search radius in metres.
pub fn validate_radius_m(radius_m: f64) -> Result<(), CoreError> {
    if !radius_m.is_finite() || radius_m <= 0.0 {
        return Err(CoreError::Validation(format!(
            "radius must be a positive number of metres, got {radius_m}"
        )));
    }
    Ok(())
}
