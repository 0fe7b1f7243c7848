//! Wire shapes of the provider's JSON responses and the pure functions
//! that turn them into results or errors.

use serde::Deserialize;

use crate::error::MapsError;
use crate::provider::{DistanceTime, GeocodeResult, ValueText, MAX_SUGGESTIONS};

const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

// ---------------------------------------------------------------------------
// Geocoding
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeEntry>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeEntry {
    #[serde(default)]
    pub formatted_address: String,
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

pub fn parse_geocode(address: &str, body: GeocodeResponse) -> Result<GeocodeResult, MapsError> {
    if body.status != STATUS_OK {
        return Err(MapsError::from_status(&body.status, body.error_message));
    }
    let first = body
        .results
        .into_iter()
        .next()
        .ok_or_else(|| MapsError::NoResults(address.to_string()))?;
    Ok(GeocodeResult {
        ltd: first.geometry.location.lat,
        lng: first.geometry.location.lng,
        formatted_address: first.formatted_address,
    })
}

// ---------------------------------------------------------------------------
// Distance matrix
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DistanceMatrixResponse {
    pub status: String,
    #[serde(default)]
    pub rows: Vec<MatrixRow>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MatrixRow {
    #[serde(default)]
    pub elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
pub struct MatrixElement {
    pub status: String,
    pub distance: Option<WireValueText>,
    pub duration: Option<WireValueText>,
}

#[derive(Debug, Deserialize)]
pub struct WireValueText {
    pub text: String,
    pub value: f64,
}

impl From<WireValueText> for ValueText {
    fn from(w: WireValueText) -> Self {
        Self {
            text: w.text,
            value: w.value,
        }
    }
}

pub fn parse_distance_matrix(route: &str, body: DistanceMatrixResponse) -> Result<DistanceTime, MapsError> {
    if body.status != STATUS_OK {
        return Err(MapsError::from_status(&body.status, body.error_message));
    }
    let element = body
        .rows
        .into_iter()
        .next()
        .and_then(|row| row.elements.into_iter().next())
        .ok_or_else(|| MapsError::NoResults(route.to_string()))?;

    if element.status != STATUS_OK {
        // Element-level NOT_FOUND / ZERO_RESULTS mean the route is unknown.
        return Err(MapsError::from_status(&element.status, None));
    }
    match (element.distance, element.duration) {
        (Some(distance), Some(duration)) => Ok(DistanceTime {
            distance: distance.into(),
            duration: duration.into(),
        }),
        _ => Err(MapsError::Malformed("distance matrix element missing distance or duration".into())),
    }
}

// ---------------------------------------------------------------------------
// Autocomplete
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AutocompleteResponse {
    pub status: String,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Prediction {
    pub description: String,
}

/// `ZERO_RESULTS` yields an empty list rather than an error.
pub fn parse_autocomplete(body: AutocompleteResponse) -> Result<Vec<String>, MapsError> {
    match body.status.as_str() {
        STATUS_OK => Ok(body
            .predictions
            .into_iter()
            .map(|p| p.description)
            .filter(|d| !d.is_empty())
            .take(MAX_SUGGESTIONS)
            .collect()),
        STATUS_ZERO_RESULTS => Ok(Vec::new()),
        other => Err(MapsError::from_status(other, body.error_message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn wire<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    // -- geocode --

    #[test]
    fn geocode_takes_first_result() {
        let body = wire(json!({
            "status": "OK",
            "results": [
                {"formatted_address": "Powai, Mumbai", "geometry": {"location": {"lat": 19.1176, "lng": 72.906}}},
                {"formatted_address": "Elsewhere", "geometry": {"location": {"lat": 0.0, "lng": 0.0}}}
            ]
        }));
        let result = parse_geocode("powai", body).unwrap();
        assert_eq!(result.ltd, 19.1176);
        assert_eq!(result.lng, 72.906);
        assert_eq!(result.formatted_address, "Powai, Mumbai");
    }

    #[test]
    fn geocode_zero_results_is_resolution_failure() {
        let body = wire(json!({"status": "ZERO_RESULTS", "results": []}));
        let err = parse_geocode("nowhere", body).unwrap_err();
        assert!(err.is_resolution_failure());
    }

    #[test]
    fn geocode_ok_but_empty_is_no_results() {
        let body = wire(json!({"status": "OK", "results": []}));
        assert_matches!(parse_geocode("x", body), Err(MapsError::NoResults(_)));
    }

    #[test]
    fn geocode_denied_carries_message() {
        let body = wire(json!({"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}));
        let err = parse_geocode("x", body).unwrap_err();
        assert!(!err.is_resolution_failure());
        assert!(err.to_string().contains("API key is invalid"));
    }

    // -- distance matrix --

    #[test]
    fn distance_matrix_returns_first_element() {
        let body = wire(json!({
            "status": "OK",
            "rows": [{"elements": [{
                "status": "OK",
                "distance": {"text": "5.0 km", "value": 5000},
                "duration": {"text": "12 mins", "value": 720}
            }]}]
        }));
        let dt = parse_distance_matrix("a -> b", body).unwrap();
        assert_eq!(dt.distance.value, 5000.0);
        assert_eq!(dt.duration.value, 720.0);
        assert_eq!(dt.duration.text, "12 mins");
    }

    #[test]
    fn distance_matrix_element_not_found_is_resolution_failure() {
        let body = wire(json!({
            "status": "OK",
            "rows": [{"elements": [{"status": "NOT_FOUND"}]}]
        }));
        assert!(parse_distance_matrix("a -> b", body).unwrap_err().is_resolution_failure());
    }

    #[test]
    fn distance_matrix_over_quota_is_dependency_failure() {
        let body = wire(json!({"status": "OVER_QUERY_LIMIT", "rows": []}));
        assert!(!parse_distance_matrix("a -> b", body).unwrap_err().is_resolution_failure());
    }

    #[test]
    fn distance_matrix_missing_values_is_malformed() {
        let body = wire(json!({
            "status": "OK",
            "rows": [{"elements": [{"status": "OK", "distance": {"text": "1 km", "value": 1000}}]}]
        }));
        assert_matches!(parse_distance_matrix("a -> b", body), Err(MapsError::Malformed(_)));
    }

    // -- autocomplete --

    #[test]
    fn autocomplete_caps_at_five() {
        let predictions: Vec<_> = (0..8).map(|i| json!({"description": format!("Place {i}")})).collect();
        let body = wire(json!({"status": "OK", "predictions": predictions}));
        let list = parse_autocomplete(body).unwrap();
        assert_eq!(list.len(), 5);
        assert_eq!(list[0], "Place 0");
    }

    #[test]
    fn autocomplete_zero_results_is_empty() {
        let body = wire(json!({"status": "ZERO_RESULTS"}));
        assert!(parse_autocomplete(body).unwrap().is_empty());
    }

    #[test]
    fn autocomplete_error_status_propagates() {
        let body = wire(json!({"status": "REQUEST_DENIED"}));
        assert!(parse_autocomplete(body).is_err());
    }
}
