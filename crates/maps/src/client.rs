//! HTTP implementation of [`MapsProvider`] against the Google Maps web
//! services, using [`reqwest`].

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::MapsError;
use crate::provider::{validate_suggestion_input, DistanceTime, GeocodeResult, MapsProvider};
use crate::response::{
    parse_autocomplete, parse_distance_matrix, parse_geocode, AutocompleteResponse, DistanceMatrixResponse,
    GeocodeResponse,
};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct MapsConfig {
    /// Provider key. When `None` every call fails with [`MapsError::MissingApiKey`].
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// HTTP client for the provider. Cheap to clone.
#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleMapsClient {
    pub fn new(config: MapsConfig) -> Result<Self, MapsError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(client, config))
    }

    /// Build a client reusing an existing [`reqwest::Client`]. The client's
    /// own timeout applies instead of `config.timeout`.
    pub fn with_client(client: reqwest::Client, config: MapsConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    // ---- private helpers ----

    /// `GET {base_url}{path}?{params}&key=...` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T, MapsError> {
        let key = self.api_key.as_deref().ok_or(MapsError::MissingApiKey)?;

        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .query(params)
            .query(&[("key", key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(MapsError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

impl MapsProvider for GoogleMapsClient {
    async fn geocode(&self, address: &str) -> Result<GeocodeResult, MapsError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(MapsError::InvalidInput("Address is required".into()));
        }
        let body: GeocodeResponse = self.get_json("/geocode/json", &[("address", address)]).await?;
        let result = parse_geocode(address, body);
        if let Err(e) = &result {
            tracing::debug!(address, error = %e, "geocode failed");
        }
        result
    }

    async fn distance_time(&self, origin: &str, destination: &str) -> Result<DistanceTime, MapsError> {
        let (origin, destination) = (origin.trim(), destination.trim());
        if origin.is_empty() || destination.is_empty() {
            return Err(MapsError::InvalidInput("Origin and destination are required".into()));
        }
        let body: DistanceMatrixResponse = self
            .get_json(
                "/distancematrix/json",
                &[("origins", origin), ("destinations", destination)],
            )
            .await?;
        parse_distance_matrix(&format!("{origin} -> {destination}"), body)
    }

    async fn suggestions(&self, input: &str) -> Result<Vec<String>, MapsError> {
        let input = validate_suggestion_input(input)?;
        let body: AutocompleteResponse = self.get_json("/place/autocomplete/json", &[("input", input)]).await?;
        parse_autocomplete(body)
    }
}
