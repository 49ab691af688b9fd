//! Route query orchestration: places passed at fixed intervals between two
//! named locations.

use serde::Serialize;

use crate::config::ResolverConfig;
use crate::error::{Error, Result};
use crate::geodesic::cumulative_distances;
use crate::polyline::{self, Coordinate, DecodeError};
use crate::resolver::PlaceResolver;
use crate::sampler::{SamplePoint, sample_at_intervals};
use crate::traits::{Geocoder, ReverseGeocoder, RouteProvider};

pub const DEFAULT_INTERVAL_KM: f64 = 100.0;

/// Outcome of one route query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlaces {
    pub start_location: String,
    pub end_location: String,
    pub interval_km: f64,
    /// Route length measured along the decoded geometry, in meters.
    pub total_distance_m: f64,
    pub samples: Vec<SamplePoint>,
    /// One name per sample, in travel order.
    pub places: Vec<String>,
}

/// Runs geocode, route fetch, decode, sampling and name resolution.
///
/// Generic over a single provider type implementing all three collaborator
/// traits, which is how the OpenRouteService adapter is shaped.
pub struct RoutePlanner<P> {
    provider: P,
    resolver: ResolverConfig,
}

impl<P> RoutePlanner<P>
where
    P: Geocoder + ReverseGeocoder + RouteProvider + Sync,
{
    pub fn new(provider: P, resolver: ResolverConfig) -> Self {
        Self { provider, resolver }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn places_along_route(&self, start: &str, end: &str, interval_km: f64) -> Result<RoutePlaces> {
        if !interval_km.is_finite() || interval_km <= 0.0 {
            return Err(Error::input(format!(
                "interval_km must be greater than 0, got {}",
                interval_km
            )));
        }

        tracing::info!(start, end, interval_km, "planning route places");
        let start_coords = self.locate(start, "start")?;
        let end_coords = self.locate(end, "end")?;

        let geometry = match self.provider.fetch_route(start_coords, end_coords) {
            Ok(geometry) => geometry,
            Err(err) if err.is_not_found() => {
                return Err(Error::RouteUnavailable {
                    start: start.to_string(),
                    end: end.to_string(),
                });
            }
            Err(err) => {
                return Err(Error::RouteFetch {
                    start: start.to_string(),
                    end: end.to_string(),
                    source: Box::new(err),
                });
            }
        };

        let route = match polyline::decode(&geometry.encoded, polyline::DEFAULT_PRECISION) {
            Ok(route) => route,
            Err(err) => {
                tracing::warn!(error = %err, "route geometry could not be decoded");
                return Err(self.no_route_data(start, end, Some(err)));
            }
        };

        let distances = cumulative_distances(route.points());
        let Some(&total_distance_m) = distances.last() else {
            return Err(self.no_route_data(start, end, None));
        };
        if let Some(reported) = geometry.distance_m {
            tracing::debug!(reported_m = reported, measured_m = total_distance_m, "route length");
        }

        let interval_m = interval_km * 1_000.0;
        self.check_sample_budget(total_distance_m, interval_m)?;
        let samples = sample_at_intervals(route.points(), &distances, interval_m)?;
        if samples.is_empty() {
            return Err(Error::NoIntermediatePlaces {
                total_km: total_distance_m / 1_000.0,
                interval_km,
            });
        }

        let places = PlaceResolver::new(&self.provider, &self.resolver).resolve_all(&samples);
        tracing::info!(start, end, places = places.len(), "route places resolved");

        Ok(RoutePlaces {
            start_location: start.to_string(),
            end_location: end.to_string(),
            interval_km,
            total_distance_m,
            samples,
            places,
        })
    }

    fn locate(&self, name: &str, role: &'static str) -> Result<Coordinate> {
        self.provider.geocode(name).map_err(|err| {
            if err.is_not_found() {
                Error::not_found(format!("{} location '{}'", role, name))
            } else {
                Error::Geocoding {
                    role,
                    name: name.to_string(),
                    source: Box::new(err),
                }
            }
        })
    }

    /// Rejects intervals that would need more than `max_samples` reverse
    /// lookups. Checked before sampling so a tiny interval never walks the
    /// whole route.
    fn check_sample_budget(&self, total_m: f64, interval_m: f64) -> Result<()> {
        let max_samples = self.resolver.max_samples;
        // targets strictly below the total: ceil(total / interval) - 1
        let needed = (total_m / interval_m).ceil() - 1.0;
        if needed > max_samples as f64 {
            return Err(Error::input(format!(
                "an interval of {} km needs {} samples on a {:.1} km route, more than the limit of {}",
                interval_m / 1_000.0,
                needed,
                total_m / 1_000.0,
                max_samples
            )));
        }
        Ok(())
    }

    fn no_route_data(&self, start: &str, end: &str, source: Option<DecodeError>) -> Error {
        Error::NoRouteData {
            start: start.to_string(),
            end: end.to_string(),
            source,
        }
    }
}
