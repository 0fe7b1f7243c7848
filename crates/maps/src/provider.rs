//! The [`MapsProvider`] trait and the result types it returns.

use hopinn_core::geo::Coordinates;
use serde::Serialize;

use crate::error::MapsError;

/// Minimum autocomplete input length, in characters.
pub const MIN_SUGGESTION_INPUT: usize = 2;
/// Maximum autocomplete input length, in characters.
pub const MAX_SUGGESTION_INPUT: usize = 100;
/// Maximum number of suggestions returned.
pub const MAX_SUGGESTIONS: usize = 5;

/// A geocoded address in the `{ltd, lng}` shape clients expect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    pub ltd: f64,
    pub lng: f64,
    pub formatted_address: String,
}

impl GeocodeResult {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.ltd, self.lng)
    }
}

/// A provider measurement: human text plus the raw value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueText {
    pub text: String,
    pub value: f64,
}

/// Road distance (metres) and travel time (seconds) between two places.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceTime {
    pub distance: ValueText,
    pub duration: ValueText,
}

/// External geocoding, routing and autocomplete.
pub trait MapsProvider: Send + Sync {
    /// Resolve a free-text address to coordinates.
    fn geocode(&self, address: &str) -> impl std::future::Future<Output = Result<GeocodeResult, MapsError>> + Send;

    /// Road distance and duration between two free-text places.
    fn distance_time(
        &self,
        origin: &str,
        destination: &str,
    ) -> impl std::future::Future<Output = Result<DistanceTime, MapsError>> + Send;

    /// Up to [`MAX_SUGGESTIONS`] place descriptions for partial input.
    fn suggestions(&self, input: &str) -> impl std::future::Future<Output = Result<Vec<String>, MapsError>> + Send;
}

/// Trim and length-check autocomplete input.
pub fn validate_suggestion_input(input: &str) -> Result<&str, MapsError> {
    let trimmed = input.trim();
    let len = trimmed.chars().count();
    if !(MIN_SUGGESTION_INPUT..=MAX_SUGGESTION_INPUT).contains(&len) {
        return Err(MapsError::InvalidInput(format!(
            "Input must be between {MIN_SUGGESTION_INPUT} and {MAX_SUGGESTION_INPUT} characters"
        )));
    }
    Ok(trimmed)
}
