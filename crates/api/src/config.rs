use std::time::Duration;

use hopinn_maps::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use hopinn_maps::MapsConfig;

use crate::auth::jwt::JwtConfig;

/// Default radius for the nearby-captain lookup, in metres.
pub const DEFAULT_CAPTAIN_SEARCH_RADIUS_M: f64 = 2_000.0;

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `4000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, lifetime).
    pub jwt: JwtConfig,
    /// External maps provider settings.
    pub maps: MapsConfig,
    /// Radius used by `/captains/nearby` when the caller gives none.
    pub captain_search_radius_m: f64,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                                 |
    /// |---------------------------|-----------------------------------------|
    /// | `HOST`                    | `0.0.0.0`                               |
    /// | `PORT`                    | `4000`                                  |
    /// | `CORS_ORIGINS`            | `http://localhost:3000`                 |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                                    |
    /// | `GOOGLE_MAPS_API`         | unset                                   |
    /// | `MAPS_BASE_URL`           | `https://maps.googleapis.com/maps/api`  |
    /// | `MAPS_TIMEOUT_SECS`       | `10`                                    |
    /// | `CAPTAIN_SEARCH_RADIUS_M` | `2000`                                  |
    /// | `LOG_FORMAT`              | `text`                                  |
    ///
    /// # Panics
    ///
    /// Panics on unparseable values and when `JWT_SECRET` is missing; a
    /// misconfigured server should not start.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "4000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let maps_timeout = std::env::var("MAPS_TIMEOUT_SECS")
            .ok()
            .map(|v| v.parse::<u64>().expect("MAPS_TIMEOUT_SECS must be a valid u64"))
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let maps = MapsConfig {
            api_key: std::env::var("GOOGLE_MAPS_API").ok(),
            base_url: std::env::var("MAPS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
            timeout: maps_timeout,
        };

        let captain_search_radius_m: f64 = std::env::var("CAPTAIN_SEARCH_RADIUS_M")
            .ok()
            .map(|v| v.parse().expect("CAPTAIN_SEARCH_RADIUS_M must be a number"))
            .unwrap_or(DEFAULT_CAPTAIN_SEARCH_RADIUS_M);

        let log_format = LogFormat::parse(&std::env::var("LOG_FORMAT").unwrap_or_default());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            maps,
            captain_search_radius_m,
            log_format,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
