//! Client for the external geocoding, distance-matrix and place
//! autocomplete provider.
//!
//! Callers depend on the [`MapsProvider`] trait; [`GoogleMapsClient`] is
//! the production implementation.

pub mod client;
pub mod error;
pub mod provider;
pub mod response;

pub use client::{GoogleMapsClient, MapsConfig};
pub use error::MapsError;
pub use provider::{validate_suggestion_input, DistanceTime, GeocodeResult, MapsProvider, ValueText};
