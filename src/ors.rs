//! OpenRouteService HTTP adapter: geocoding, reverse geocoding, directions.

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::json;

use crate::config::OrsConfig;
use crate::error::{Error, Result};
use crate::polyline::Coordinate;
use crate::traits::{AdminFields, Geocoder, ReverseGeocoder, RouteGeometry, RouteProvider};

const SERVICE: &str = "OpenRouteService";

/// ORS error codes meaning "there is no route", as opposed to a bad request.
const ROUTE_NOT_FOUND_CODES: [i64; 2] = [2009, 2010];

#[derive(Debug, Clone)]
pub struct OrsClient {
    config: OrsConfig,
    client: Client,
}

impl OrsClient {
    pub fn new(config: OrsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OrsConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::configuration(SERVICE, "OPENROUTESERVICE_API_KEY is not set"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Passes successful responses through and classifies the rest.
    fn check(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let (code, message) = error_details(&body);
        tracing::debug!(%status, ?code, %message, "OpenRouteService returned an error");

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::configuration(
                SERVICE,
                format!("API key was rejected (HTTP {})", status.as_u16()),
            )),
            StatusCode::NOT_FOUND => Err(Error::not_found(message)),
            _ if code.is_some_and(|code| ROUTE_NOT_FOUND_CODES.contains(&code)) => {
                Err(Error::not_found(message))
            }
            _ => Err(Error::provider(
                SERVICE,
                format!("HTTP {}: {}", status.as_u16(), message),
            )),
        }
    }
}

impl Geocoder for OrsClient {
    fn geocode(&self, name: &str) -> Result<Coordinate> {
        let key = self.api_key()?;
        let layers = self.config.search_layers.join(",");
        tracing::debug!(name, %layers, "geocoding");

        let response = self
            .client
            .get(self.url("geocode/search"))
            .header("Authorization", key)
            .query(&[("text", name), ("size", "1"), ("layers", layers.as_str())])
            .send()?;
        let body: SearchResponse = self.check(response)?.json()?;

        let coordinate = body
            .features
            .into_iter()
            .next()
            .and_then(|feature| feature.geometry)
            .and_then(|geometry| match geometry.coordinates.as_slice() {
                // GeoJSON order is [lon, lat]
                [lon, lat] => Some(Coordinate::new(*lat, *lon)),
                _ => None,
            })
            .filter(Coordinate::is_valid)
            .ok_or_else(|| Error::not_found(format!("location '{}'", name)))?;

        tracing::info!(name, lat = coordinate.lat, lon = coordinate.lon, "geocoded");
        Ok(coordinate)
    }
}

impl ReverseGeocoder for OrsClient {
    fn reverse_geocode(&self, coordinate: Coordinate) -> Result<AdminFields> {
        let key = self.api_key()?;

        let response = self
            .client
            .get(self.url("geocode/reverse"))
            .header("Authorization", key)
            .query(&[
                ("point.lat", coordinate.lat.to_string()),
                ("point.lon", coordinate.lon.to_string()),
                ("size", "1".to_string()),
            ])
            .send()?;
        let body: ReverseResponse = self.check(response)?.json()?;

        body.features
            .into_iter()
            .next()
            .map(|feature| feature.properties)
            .ok_or_else(|| {
                Error::not_found(format!("place at ({:.4}, {:.4})", coordinate.lat, coordinate.lon))
            })
    }
}

impl RouteProvider for OrsClient {
    fn fetch_route(&self, start: Coordinate, end: Coordinate) -> Result<RouteGeometry> {
        let key = self.api_key()?;
        let radius = self.config.snap_radius_m;
        let request = json!({
            "coordinates": [[start.lon, start.lat], [end.lon, end.lat]],
            "instructions": false,
            "radiuses": [radius, radius],
        });

        tracing::debug!(?start, ?end, profile = %self.config.profile, "requesting route");
        let response = self
            .client
            .post(self.url(&format!("v2/directions/{}/json", self.config.profile)))
            .header("Authorization", key)
            .json(&request)
            .send()?;
        let body: DirectionsResponse = self.check(response)?.json()?;

        let route = body
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found("route"))?;
        let distance_m = route.summary.and_then(|summary| summary.distance);
        tracing::info!(?distance_m, "route fetched");

        Ok(RouteGeometry {
            encoded: route.geometry,
            distance_m,
        })
    }
}

/// Pulls `(code, message)` out of an ORS error body. Falls back to the raw text.
fn error_details(body: &str) -> (Option<i64>, String) {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|value| value.get("error"));

    let code = error.and_then(|error| error.get("code")).and_then(|code| code.as_i64());
    let message = error
        .and_then(|error| match error {
            serde_json::Value::String(message) => Some(message.clone()),
            other => other.get("message").and_then(|m| m.as_str()).map(str::to_string),
        })
        .unwrap_or_else(|| body.trim().chars().take(200).collect());

    (code, message)
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    features: Vec<SearchFeature>,
}

#[derive(Debug, Deserialize)]
struct SearchFeature {
    geometry: Option<PointGeometry>,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    #[serde(default)]
    coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    features: Vec<ReverseFeature>,
}

#[derive(Debug, Deserialize)]
struct ReverseFeature {
    #[serde(default)]
    properties: AdminFields,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    geometry: String,
    summary: Option<RouteSummary>,
}

#[derive(Debug, Deserialize)]
struct RouteSummary {
    distance: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_configuration_error() {
        let client = OrsClient::new(OrsConfig::default()).unwrap();
        let err = client.geocode("Tampere").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }), "{:?}", err);

        let err = client
            .reverse_geocode(Coordinate::new(61.4991, 23.7871))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }), "{:?}", err);
    }

    #[test]
    fn test_error_details_structured() {
        let body = r#"{"error":{"code":2010,"message":"Could not find routable point within a radius of 5000.0 meters"},"info":{}}"#;
        let (code, message) = error_details(body);
        assert_eq!(code, Some(2010));
        assert!(message.starts_with("Could not find routable point"));
    }

    #[test]
    fn test_error_details_plain_string() {
        let (code, message) = error_details(r#"{"error":"Access to this API has been disallowed"}"#);
        assert_eq!(code, None);
        assert_eq!(message, "Access to this API has been disallowed");
    }

    #[test]
    fn test_error_details_not_json() {
        let (code, message) = error_details("  Bad Gateway \n");
        assert_eq!(code, None);
        assert_eq!(message, "Bad Gateway");
    }

    #[test]
    fn test_url_joins_base() {
        let config = OrsConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..OrsConfig::default()
        };
        let client = OrsClient::new(config).unwrap();
        assert_eq!(client.url("geocode/search"), "http://localhost:8080/geocode/search");
    }
}
