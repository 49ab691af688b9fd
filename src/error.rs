//! Error taxonomy shared by the route and weather tools.

use thiserror::Error;

use crate::polyline::DecodeError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or rejected provider credentials.
    #[error("{service} is not configured: {reason}")]
    Configuration {
        service: &'static str,
        reason: String,
    },

    /// A name or coordinate the provider could not resolve.
    #[error("{what} could not be found")]
    NotFound { what: String },

    /// The provider answered, but not with something usable.
    #[error("{service} request failed: {message}")]
    Provider {
        service: &'static str,
        message: String,
    },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Caller error: bad interval, mismatched inputs, missing tool arguments.
    #[error("invalid input: {0}")]
    Input(String),

    /// Geocoding one endpoint of a route query failed for a reason other
    /// than an unknown name.
    #[error("could not geocode {role} location '{name}': {source}")]
    Geocoding {
        role: &'static str,
        name: String,
        #[source]
        source: Box<Error>,
    },

    /// The directions request failed for a reason other than "no route".
    #[error("could not fetch the route between {start} and {end}: {source}")]
    RouteFetch {
        start: String,
        end: String,
        #[source]
        source: Box<Error>,
    },

    /// Empty or undecodable geometry. `source` is set when decoding failed.
    #[error("no route data was returned between {start} and {end}")]
    NoRouteData {
        start: String,
        end: String,
        #[source]
        source: Option<DecodeError>,
    },

    #[error("no drivable route is available between {start} and {end}")]
    RouteUnavailable { start: String, end: String },

    #[error(
        "no intermediate places: the route is {total_km:.1} km long, \
         which does not exceed the {interval_km} km interval"
    )]
    NoIntermediatePlaces { total_km: f64, interval_km: f64 },
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound { what: what.into() }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Error::Input(message.into())
    }

    pub fn provider(service: &'static str, message: impl Into<String>) -> Self {
        Error::Provider {
            service,
            message: message.into(),
        }
    }

    pub fn configuration(service: &'static str, reason: impl Into<String>) -> Self {
        Error::Configuration {
            service,
            reason: reason.into(),
        }
    }

    /// True for `Error::NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
