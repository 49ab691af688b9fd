//! Collaborator interfaces for the route and weather tools.
//!
//! These keep the route pipeline independent of any particular provider.
//! The HTTP adapters in [`crate::ors`] and [`crate::weather`] implement them;
//! tests implement them with in-memory fakes.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::polyline::Coordinate;
use crate::weather::{ForecastPeriod, WeatherReport};

/// Administrative names a reverse geocoder knows for a point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminFields {
    pub locality: Option<String>,
    pub county: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl AdminFields {
    /// The most specific non-blank name: locality, county, region, then country.
    pub fn display_name(&self) -> Option<&str> {
        [&self.locality, &self.county, &self.region, &self.country]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .map(str::trim)
            .find(|name| !name.is_empty())
    }
}

/// Encoded geometry of the best driving route between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGeometry {
    /// Encoded polyline, precision 5.
    pub encoded: String,
    /// Provider-reported route length in meters, when available.
    pub distance_m: Option<f64>,
}

/// Forward geocoding: place name to coordinate.
pub trait Geocoder {
    /// Returns `Error::NotFound` when nothing matches `name`.
    fn geocode(&self, name: &str) -> Result<Coordinate>;
}

/// Reverse geocoding: coordinate to administrative names.
///
/// An `AdminFields` with every field empty is a valid answer.
pub trait ReverseGeocoder {
    fn reverse_geocode(&self, coordinate: Coordinate) -> Result<AdminFields>;
}

/// Driving routes between two coordinates.
pub trait RouteProvider {
    fn fetch_route(&self, start: Coordinate, end: Coordinate) -> Result<RouteGeometry>;
}

/// Current conditions and multi-day forecasts for a city.
pub trait WeatherProvider {
    fn current_weather(&self, city: &str) -> Result<WeatherReport>;

    /// Forecast periods in chronological order.
    fn forecast(&self, city: &str) -> Result<Vec<ForecastPeriod>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(locality: &str, county: &str, region: &str, country: &str) -> AdminFields {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        AdminFields {
            locality: opt(locality),
            county: opt(county),
            region: opt(region),
            country: opt(country),
        }
    }

    #[test]
    fn test_display_name_precedence() {
        assert_eq!(
            fields("Jyväskylä", "Jyväskylä", "Central Finland", "Finland").display_name(),
            Some("Jyväskylä")
        );
        assert_eq!(
            fields("", "Keuruu", "Central Finland", "Finland").display_name(),
            Some("Keuruu")
        );
        assert_eq!(
            fields("", "", "Lapland", "Finland").display_name(),
            Some("Lapland")
        );
        assert_eq!(fields("", "", "", "Finland").display_name(), Some("Finland"));
    }

    #[test]
    fn test_display_name_skips_blank_values() {
        let admin = AdminFields {
            locality: Some("   ".to_string()),
            county: Some(String::new()),
            region: Some(" Pirkanmaa ".to_string()),
            country: None,
        };
        assert_eq!(admin.display_name(), Some("Pirkanmaa"));
    }

    #[test]
    fn test_display_name_empty() {
        assert_eq!(AdminFields::default().display_name(), None);
    }
}
