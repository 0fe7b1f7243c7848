//! Fare calculation for campus and external rides.
//!
//! A quote is computed once per ride, at creation time, and the amount for
//! the requested vehicle type is frozen on the ride row. Two rate tables
//! exist: a cheaper one for rides between known campus locations (distance
//! from the haversine formula, duration from a fixed campus-speed
//! heuristic) and one for everything else (distance and duration from the
//! external distance provider).

use serde::Serialize;

use crate::error::CoreError;
use crate::geo::{haversine_m, Coordinates};
use crate::vehicle::VehicleType;

// ---------------------------------------------------------------------------
// Rate tables
// ---------------------------------------------------------------------------

/// Per-vehicle pricing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateCard {
    pub base: f64,
    pub per_km: f64,
    pub per_minute: f64,
}

impl RateCard {
    /// `round(base + km * per_km + minutes * per_minute)`.
    pub fn price(&self, km: f64, minutes: f64) -> i64 {
        (self.base + km * self.per_km + minutes * self.per_minute).round() as i64
    }
}

/// One [`RateCard`] per vehicle type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FareSchedule {
    pub auto: RateCard,
    pub car: RateCard,
    pub moto: RateCard,
}

impl FareSchedule {
    pub fn rates(&self, vehicle: VehicleType) -> &RateCard {
        match vehicle {
            VehicleType::Auto => &self.auto,
            VehicleType::Car => &self.car,
            VehicleType::Moto => &self.moto,
        }
    }

    fn quote(&self, km: f64, minutes: f64) -> FareQuote {
        FareQuote {
            auto: self.auto.price(km, minutes),
            car: self.car.price(km, minutes),
            moto: self.moto.price(km, minutes),
        }
    }
}

/// Rates for rides whose endpoints are both campus locations.
pub const CAMPUS_RATES: FareSchedule = FareSchedule {
    auto: RateCard {
        base: 15.0,
        per_km: 5.0,
        per_minute: 1.0,
    },
    car: RateCard {
        base: 25.0,
        per_km: 8.0,
        per_minute: 1.5,
    },
    moto: RateCard {
        base: 10.0,
        per_km: 3.0,
        per_minute: 0.5,
    },
};

/// Rates for rides priced from the external distance provider.
pub const EXTERNAL_RATES: FareSchedule = FareSchedule {
    auto: RateCard {
        base: 30.0,
        per_km: 10.0,
        per_minute: 2.0,
    },
    car: RateCard {
        base: 50.0,
        per_km: 15.0,
        per_minute: 3.0,
    },
    moto: RateCard {
        base: 20.0,
        per_km: 8.0,
        per_minute: 1.5,
    },
};

/// Minimum billed duration for a campus ride, in minutes.
pub const CAMPUS_MIN_MINUTES: u32 = 2;

/// Campus speed heuristic: minutes of travel per kilometre.
pub const CAMPUS_MINUTES_PER_KM: f64 = 3.0;

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

/// Integer price for every vehicle type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FareQuote {
    pub auto: i64,
    pub car: i64,
    pub moto: i64,
}

impl FareQuote {
    pub fn for_vehicle(&self, vehicle: VehicleType) -> i64 {
        match vehicle {
            VehicleType::Auto => self.auto,
            VehicleType::Car => self.car,
            VehicleType::Moto => self.moto,
        }
    }
}

/// Informational trip size recorded on the ride alongside the fare.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripEstimate {
    pub distance_m: f64,
    pub duration_s: f64,
}

/// A quote together with the trip estimate it was priced from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedTrip {
    pub quote: FareQuote,
    pub trip: TripEstimate,
}

/// Estimated campus travel time: `max(2, ceil(km * 3))` minutes.
pub fn campus_minutes(km: f64) -> u32 {
    let minutes = (km * CAMPUS_MINUTES_PER_KM).ceil() as u32;
    minutes.max(CAMPUS_MIN_MINUTES)
}

/// Price a ride between two campus locations.
pub fn campus_quote(pickup: &Coordinates, destination: &Coordinates) -> Result<PricedTrip, CoreError> {
    pickup.validate()?;
    destination.validate()?;

    let distance_m = haversine_m(pickup, destination);
    let km = distance_m / 1000.0;
    let minutes = campus_minutes(km);

    Ok(PricedTrip {
        quote: CAMPUS_RATES.quote(km, f64::from(minutes)),
        trip: TripEstimate {
            distance_m,
            duration_s: f64::from(minutes) * 60.0,
        },
    })
}

/// Price a ride from a provider-supplied distance (metres) and duration
/// (seconds). Non-finite or negative inputs are rejected rather than priced
/// as zero.
pub fn external_quote(distance_m: f64, duration_s: f64) -> Result<PricedTrip, CoreError> {
    if !distance_m.is_finite() || distance_m < 0.0 {
        return Err(CoreError::Validation(format!(
            "distance must be a finite, non-negative number of metres, got {distance_m}"
        )));
    }
    if !duration_s.is_finite() || duration_s < 0.0 {
        return Err(CoreError::Validation(format!(
            "duration must be a finite, non-negative number of seconds, got {duration_s}"
        )));
    }

    let km = distance_m / 1000.0;
    let minutes = duration_s / 60.0;

    Ok(PricedTrip {
        quote: EXTERNAL_RATES.quote(km, minutes),
        trip: TripEstimate {
            distance_m,
            duration_s,
        },
    })
}
