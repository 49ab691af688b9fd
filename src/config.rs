//! Provider configuration.
//!
//! Everything is plain data with sensible defaults. [`Config::from_env`]
//! fills it from the process environment, after loading a `.env` file from
//! the working directory if there is one.

use std::env;

use crate::error::{Error, Result};

pub const ORS_API_KEY_VAR: &str = "OPENROUTESERVICE_API_KEY";
pub const ORS_BASE_URL_VAR: &str = "ORS_BASE_URL";
pub const OWM_API_KEY_VAR: &str = "OPENWEATHERMAP_API_KEY";
pub const OWM_BASE_URL_VAR: &str = "OPENWEATHERMAP_BASE_URL";
pub const TIMEOUT_VAR: &str = "ROUTE_PLACES_HTTP_TIMEOUT_SECS";
pub const PARALLEL_LOOKUPS_VAR: &str = "ROUTE_PLACES_MAX_PARALLEL_LOOKUPS";
pub const MAX_SAMPLES_VAR: &str = "ROUTE_PLACES_MAX_SAMPLES";

/// OpenRouteService settings (geocoding, reverse geocoding, directions).
#[derive(Debug, Clone)]
pub struct OrsConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub profile: String,
    pub timeout_secs: u64,
    /// Geocoder layers searched for start/end names; favors routable areas
    /// over street addresses.
    pub search_layers: Vec<String>,
    /// How far from each endpoint the router may snap to a road, in meters.
    pub snap_radius_m: f64,
}

impl Default for OrsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openrouteservice.org".to_string(),
            api_key: None,
            profile: "driving-car".to_string(),
            timeout_secs: 10,
            search_layers: vec![
                "locality".to_string(),
                "region".to_string(),
                "county".to_string(),
            ],
            snap_radius_m: 5_000.0,
        }
    }
}

/// OpenWeatherMap settings.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Upper bound on concurrent reverse-geocode requests per route query.
    /// `1` resolves samples one after another.
    pub max_parallel_lookups: usize,
    /// Most sample points (and so reverse-geocode requests) one route query
    /// may produce. Intervals needing more are rejected as invalid input.
    pub max_samples: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_parallel_lookups: 4,
            max_samples: 1_000,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub ors: OrsConfig,
    pub weather: WeatherConfig,
    pub resolver: ResolverConfig,
}

impl Config {
    /// Loads `.env` (if present) and reads the environment.
    ///
    /// Missing API keys are not an error here; the adapters report them as
    /// `Error::Configuration` when first used.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
            Err(err) if err.not_found() => {}
            Err(err) => tracing::warn!(error = %err, "failed to load .env file"),
        }

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Config::default();

        config.ors.api_key = get(ORS_API_KEY_VAR);
        if let Some(base_url) = get(ORS_BASE_URL_VAR) {
            config.ors.base_url = base_url.trim_end_matches('/').to_string();
        }

        config.weather.api_key = get(OWM_API_KEY_VAR);
        if let Some(base_url) = get(OWM_BASE_URL_VAR) {
            config.weather.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Some(raw) = get(TIMEOUT_VAR) {
            let timeout_secs = parse_positive(TIMEOUT_VAR, &raw)?;
            config.ors.timeout_secs = timeout_secs;
            config.weather.timeout_secs = timeout_secs;
        }

        if let Some(raw) = get(PARALLEL_LOOKUPS_VAR) {
            config.resolver.max_parallel_lookups = parse_positive(PARALLEL_LOOKUPS_VAR, &raw)? as usize;
        }

        if let Some(raw) = get(MAX_SAMPLES_VAR) {
            config.resolver.max_samples = parse_positive(MAX_SAMPLES_VAR, &raw)? as usize;
        }

        if config.ors.api_key.is_none() {
            tracing::warn!("{} is not set; route tools will report a configuration error", ORS_API_KEY_VAR);
        }
        if config.weather.api_key.is_none() {
            tracing::warn!("{} is not set; weather tools will report a configuration error", OWM_API_KEY_VAR);
        }

        Ok(config)
    }
}

fn parse_positive(name: &str, raw: &str) -> Result<u64> {
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(Error::configuration(
            "environment",
            format!("{} must be a positive integer, got {:?}", name, raw),
        )),
    }
}
