//! In-memory providers standing in for OpenRouteService and OpenWeatherMap.

use std::sync::atomic::{AtomicUsize, Ordering};

use route_places::geodesic::distance_meters;
use route_places::polyline::{self, DEFAULT_PRECISION};
use route_places::traits::{
    AdminFields, Geocoder, ReverseGeocoder, RouteGeometry, RouteProvider, WeatherProvider,
};
use route_places::weather::{ForecastPeriod, WeatherReport};
use route_places::{Coordinate, Error, Result};

use super::finnish_locations::{self, Location, TOWNS};

/// Vertices inserted per waypoint leg when building a route geometry.
const STEPS_PER_LEG: usize = 25;

#[derive(Debug, Clone)]
pub enum RouteBehavior {
    /// Straight legs through the given waypoints.
    Waypoints(Vec<Location>),
    /// Return this geometry verbatim.
    Encoded(String),
    /// The router finds no route.
    NoRoute,
    /// The router is down.
    Unavailable,
}

/// Geocodes fixture towns, routes through waypoints, and reverse geocodes to
/// the nearest fixture town within `reverse_radius_m`.
pub struct FakeProvider {
    pub route: RouteBehavior,
    pub reverse_radius_m: f64,
    /// Towns whose reverse lookups fail with a provider error.
    pub failing_towns: Vec<&'static str>,
    /// Names whose forward geocoding fails with a server error.
    pub failing_geocodes: Vec<&'static str>,
    pub reverse_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn through(waypoints: &[Location]) -> Self {
        Self::with_route(RouteBehavior::Waypoints(waypoints.to_vec()))
    }

    pub fn with_route(route: RouteBehavior) -> Self {
        Self {
            route,
            reverse_radius_m: 35_000.0,
            failing_towns: Vec::new(),
            failing_geocodes: Vec::new(),
            reverse_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_for(mut self, town: &'static str) -> Self {
        self.failing_towns.push(town);
        self
    }

    pub fn geocoder_down_for(mut self, name: &'static str) -> Self {
        self.failing_geocodes.push(name);
        self
    }

    pub fn reverse_radius(mut self, meters: f64) -> Self {
        self.reverse_radius_m = meters;
        self
    }

    pub fn reverse_calls(&self) -> usize {
        self.reverse_calls.load(Ordering::SeqCst)
    }
}

/// Linear interpolation through `waypoints`, `STEPS_PER_LEG` vertices per leg.
pub fn densify(waypoints: &[Location]) -> Vec<Coordinate> {
    let mut points = Vec::new();
    for leg in waypoints.windows(2) {
        let (from, to) = (leg[0], leg[1]);
        for step in 0..STEPS_PER_LEG {
            let t = step as f64 / STEPS_PER_LEG as f64;
            points.push(Coordinate::new(
                from.lat + (to.lat - from.lat) * t,
                from.lon + (to.lon - from.lon) * t,
            ));
        }
    }
    if let Some(last) = waypoints.last() {
        points.push(last.coords());
    }
    points
}

impl Geocoder for FakeProvider {
    fn geocode(&self, name: &str) -> Result<Coordinate> {
        if self.failing_geocodes.iter().any(|failing| *failing == name) {
            return Err(Error::provider("fake", "HTTP 500: internal error"));
        }
        finnish_locations::find(name)
            .map(|town| town.coords())
            .ok_or_else(|| Error::not_found(format!("location '{}'", name)))
    }
}

impl ReverseGeocoder for FakeProvider {
    fn reverse_geocode(&self, coordinate: Coordinate) -> Result<AdminFields> {
        self.reverse_calls.fetch_add(1, Ordering::SeqCst);

        let nearest = TOWNS
            .iter()
            .map(|town| (town, distance_meters(coordinate, town.coords())))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .filter(|(_, meters)| *meters <= self.reverse_radius_m);

        match nearest {
            Some((town, _)) if self.failing_towns.contains(&town.name) => {
                Err(Error::provider("fake", "reverse geocoding timed out"))
            }
            Some((town, _)) => Ok(AdminFields {
                locality: Some(town.name.to_string()),
                country: Some("Finland".to_string()),
                ..AdminFields::default()
            }),
            None => Ok(AdminFields::default()),
        }
    }
}

impl RouteProvider for FakeProvider {
    fn fetch_route(&self, _start: Coordinate, _end: Coordinate) -> Result<RouteGeometry> {
        match &self.route {
            RouteBehavior::Waypoints(waypoints) => Ok(RouteGeometry {
                encoded: polyline::encode(&densify(waypoints), DEFAULT_PRECISION),
                distance_m: None,
            }),
            RouteBehavior::Encoded(encoded) => Ok(RouteGeometry {
                encoded: encoded.clone(),
                distance_m: None,
            }),
            RouteBehavior::NoRoute => Err(Error::not_found("route")),
            RouteBehavior::Unavailable => Err(Error::provider("fake", "HTTP 503: service unavailable")),
        }
    }
}

/// Weather for any city except "Atlantis".
pub struct FakeWeather {
    pub temperature_celsius: f64,
    pub description: &'static str,
    pub periods: Vec<ForecastPeriod>,
}

impl FakeWeather {
    pub fn new(periods: Vec<ForecastPeriod>) -> Self {
        Self {
            temperature_celsius: 12.5,
            description: "light rain",
            periods,
        }
    }
}

impl WeatherProvider for FakeWeather {
    fn current_weather(&self, city: &str) -> Result<WeatherReport> {
        if city.eq_ignore_ascii_case("atlantis") {
            return Err(Error::not_found(format!("weather for '{}'", city)));
        }
        Ok(WeatherReport {
            city: route_places::weather::title_case(city),
            temperature_celsius: self.temperature_celsius,
            description: self.description.to_string(),
        })
    }

    fn forecast(&self, city: &str) -> Result<Vec<ForecastPeriod>> {
        if city.eq_ignore_ascii_case("atlantis") {
            return Err(Error::not_found(format!("weather for '{}'", city)));
        }
        Ok(self.periods.clone())
    }
}

pub fn period(date: &str, min: f64, max: f64, description: &str) -> ForecastPeriod {
    ForecastPeriod {
        date: date.to_string(),
        temp_min_celsius: min,
        temp_max_celsius: max,
        description: description.to_string(),
    }
}
