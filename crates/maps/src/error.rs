//! Errors from the mapping provider layer.

/// Provider statuses meaning "the query was fine but nothing matched".
const RESOLUTION_STATUSES: &[&str] = &["ZERO_RESULTS", "NOT_FOUND"];

#[derive(Debug, thiserror::Error)]
pub enum MapsError {
    /// No API key is configured, so no request was sent.
    #[error("Maps API key is not configured")]
    MissingApiKey,

    /// Caller input was rejected before contacting the provider.
    #[error("{0}")]
    InvalidInput(String),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status code.
    #[error("Maps API error ({status}): {body}")]
    Http { status: u16, body: String },

    /// The provider answered with a top-level status other than `OK`.
    #[error("Maps API returned {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status { status: String, message: Option<String> },

    /// The response was well-formed but contained no usable result.
    #[error("No results for '{0}'")]
    NoResults(String),

    /// The response body was missing fields the client relies on.
    #[error("Malformed maps response: {0}")]
    Malformed(String),
}

impl MapsError {
    /// Build the error for a non-`OK` provider status.
    pub fn from_status(status: &str, message: Option<String>) -> Self {
        Self::Status {
            status: status.to_string(),
            message,
        }
    }

    /// Whether the lookup failed because the place or route could not be
    /// resolved, as opposed to the provider being unavailable or refusing
    /// the request.
    pub fn is_resolution_failure(&self) -> bool {
        match self {
            Self::NoResults(_) => true,
            Self::Status { status, .. } => RESOLUTION_STATUSES.contains(&status.as_str()),
            _ => false,
        }
    }
}

impl From<MapsError> for hopinn_core::error::CoreError {
    fn from(err: MapsError) -> Self {
        use hopinn_core::error::CoreError;
        match err {
            MapsError::InvalidInput(msg) => CoreError::Validation(msg),
            e if e.is_resolution_failure() => CoreError::LocationResolution(e.to_string()),
            e => CoreError::Dependency(e.to_string()),
        }
    }
}
