//! Agent-facing tools.
//!
//! Each tool takes JSON arguments and answers with a [`ToolResponse`]: a
//! `status` of `success` or `error`, a natural-language `report` or
//! `error_message`, and whatever structured fields the tool produces.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ors::OrsClient;
use crate::route::{DEFAULT_INTERVAL_KM, RoutePlaces, RoutePlanner};
use crate::traits::{Geocoder, ReverseGeocoder, RouteProvider, WeatherProvider};
use crate::weather::{DailySummary, OpenWeatherClient, WeatherReport, daily_summaries};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Uniform result envelope returned to the agent framework.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResponse {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl ToolResponse {
    pub fn success(report: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            status: Status::Success,
            report: Some(report.into()),
            error_message: None,
            data,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            report: None,
            error_message: Some(message.into()),
            data: Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|err| {
            json!({ "status": "error", "error_message": format!("could not serialize tool response: {}", err) })
        })
    }
}

impl From<Error> for ToolResponse {
    fn from(err: Error) -> Self {
        ToolResponse::error(err.to_string())
    }
}

/// Metadata the agent framework needs to offer a tool to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

pub trait Tool: Send + Sync {
    /// Name used in function calling.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema of the arguments object.
    fn parameters_schema(&self) -> Value;

    /// Runs the tool. Failures come back as an error envelope, never a panic.
    fn execute(&self, arguments: &Value) -> ToolResponse;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Builds the route and weather tools from configuration.
pub fn default_tools(config: &Config) -> Result<Vec<Box<dyn Tool>>> {
    let ors = OrsClient::new(config.ors.clone())?;
    let weather = OpenWeatherClient::new(config.weather.clone())?;

    let tools: Vec<Box<dyn Tool>> = vec![
        Box::new(RoutePlacesTool::new(RoutePlanner::new(ors, config.resolver.clone()))),
        Box::new(CurrentWeatherTool::new(weather.clone())),
        Box::new(WeatherForecastTool::new(weather)),
    ];
    Ok(tools)
}

fn parse_arguments<T: DeserializeOwned>(tool: &str, arguments: &Value) -> Result<T> {
    T::deserialize(arguments).map_err(|err| Error::input(format!("invalid arguments for {}: {}", tool, err)))
}

fn to_object(value: impl Serialize) -> Map<String, Value> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

// ============================================================================
// Route places
// ============================================================================

pub struct RoutePlacesTool<P> {
    planner: RoutePlanner<P>,
}

#[derive(Debug, Deserialize)]
struct RouteArguments {
    start_location: String,
    end_location: String,
    #[serde(default = "default_interval_km")]
    interval_km: f64,
}

fn default_interval_km() -> f64 {
    DEFAULT_INTERVAL_KM
}

impl<P> RoutePlacesTool<P>
where
    P: Geocoder + ReverseGeocoder + RouteProvider + Send + Sync,
{
    pub fn new(planner: RoutePlanner<P>) -> Self {
        Self { planner }
    }

    /// Places passed every `interval_km` between two named locations.
    pub fn get_route_places(&self, start: &str, end: &str, interval_km: f64) -> ToolResponse {
        match self.planner.places_along_route(start, end, interval_km) {
            Ok(result) => route_response(&result),
            Err(err) => {
                tracing::warn!(start, end, error = %err, "route places query failed");
                ToolResponse::from(err)
                    .with_field("start_location", start)
                    .with_field("end_location", end)
            }
        }
    }
}

fn route_response(result: &RoutePlaces) -> ToolResponse {
    let data = to_object(json!({
        "start_location": result.start_location,
        "end_location": result.end_location,
        "interval_km": result.interval_km,
        "total_distance_km": result.total_distance_m / 1_000.0,
        "places": result.places,
    }));
    ToolResponse::success(
        route_report(
            &result.start_location,
            &result.end_location,
            result.interval_km,
            &result.places,
        ),
        data,
    )
}

/// "On the route from A to B (with stops every 100km), you will pass through: X, Y, and Z."
pub fn route_report(start: &str, end: &str, interval_km: f64, places: &[String]) -> String {
    match places {
        [] => format!("No places were found on the route from {} to {}.", start, end),
        [only] => format!(
            "On the route from {} to {}, you will pass through: {}.",
            start, end, only
        ),
        [init @ .., last] => format!(
            "On the route from {} to {} (with stops every {}km), you will pass through: {}, and {}.",
            start,
            end,
            interval_km,
            init.join(", "),
            last
        ),
    }
}

impl<P> Tool for RoutePlacesTool<P>
where
    P: Geocoder + ReverseGeocoder + RouteProvider + Send + Sync,
{
    fn name(&self) -> &str {
        "get_route_places"
    }

    fn description(&self) -> &str {
        "Find the cities, towns and regions a driver passes through at regular distance \
         intervals on the driving route between two locations."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "start_location": {
                    "type": "string",
                    "description": "Starting location (city, address, landmark)"
                },
                "end_location": {
                    "type": "string",
                    "description": "Destination location (city, address, landmark)"
                },
                "interval_km": {
                    "type": "number",
                    "description": "Distance between reported places in kilometers",
                    "default": DEFAULT_INTERVAL_KM,
                    "exclusiveMinimum": 0
                }
            },
            "required": ["start_location", "end_location"]
        })
    }

    fn execute(&self, arguments: &Value) -> ToolResponse {
        match parse_arguments::<RouteArguments>(self.name(), arguments) {
            Ok(args) => self.get_route_places(&args.start_location, &args.end_location, args.interval_km),
            Err(err) => err.into(),
        }
    }
}

// ============================================================================
// Weather
// ============================================================================

#[derive(Debug, Deserialize)]
struct CityArguments {
    city: String,
}

fn city_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "city": {
                "type": "string",
                "description": "Name of the city, optionally with a country code (\"Tampere,FI\")"
            }
        },
        "required": ["city"]
    })
}

pub struct CurrentWeatherTool<W> {
    provider: W,
}

impl<W: WeatherProvider + Send + Sync> CurrentWeatherTool<W> {
    pub fn new(provider: W) -> Self {
        Self { provider }
    }

    pub fn get_weather(&self, city: &str) -> ToolResponse {
        match self.provider.current_weather(city) {
            Ok(weather) => ToolResponse::success(weather_report(&weather), to_object(&weather)),
            Err(err) => {
                tracing::warn!(city, error = %err, "weather query failed");
                err.into()
            }
        }
    }
}

/// "The weather in Tampere is light rain with a temperature of 12.5°C."
pub fn weather_report(weather: &WeatherReport) -> String {
    format!(
        "The weather in {} is {} with a temperature of {}°C.",
        weather.city, weather.description, weather.temperature_celsius
    )
}

impl<W: WeatherProvider + Send + Sync> Tool for CurrentWeatherTool<W> {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get the current weather report for a city."
    }

    fn parameters_schema(&self) -> Value {
        city_schema()
    }

    fn execute(&self, arguments: &Value) -> ToolResponse {
        match parse_arguments::<CityArguments>(self.name(), arguments) {
            Ok(args) => self.get_weather(&args.city),
            Err(err) => err.into(),
        }
    }
}

pub struct WeatherForecastTool<W> {
    provider: W,
}

impl<W: WeatherProvider + Send + Sync> WeatherForecastTool<W> {
    pub fn new(provider: W) -> Self {
        Self { provider }
    }

    pub fn get_weather_forecast(&self, city: &str) -> ToolResponse {
        let days = match self.provider.forecast(city) {
            Ok(periods) => daily_summaries(&periods),
            Err(err) => {
                tracing::warn!(city, error = %err, "forecast query failed");
                return err.into();
            }
        };

        let city = crate::weather::title_case(city);
        ToolResponse::success(forecast_report(&city, &days), Map::new())
            .with_field("city", city.as_str())
            .with_field("daily_summaries", serde_json::to_value(&days).unwrap_or_default())
    }
}

/// One line per day: "2024-06-01: light rain, 9.5°C to 17.0°C".
pub fn forecast_report(city: &str, days: &[DailySummary]) -> String {
    let mut report = format!("Weather forecast for {}:", city);
    for day in days {
        report.push_str(&format!(
            "\n{}: {}, {:.1}°C to {:.1}°C",
            day.date, day.description, day.min_celsius, day.max_celsius
        ));
    }
    report
}

impl<W: WeatherProvider + Send + Sync> Tool for WeatherForecastTool<W> {
    fn name(&self) -> &str {
        "get_weather_forecast"
    }

    fn description(&self) -> &str {
        "Get a day-by-day weather forecast (minimum and maximum temperature and the \
         prevailing conditions) for a city."
    }

    fn parameters_schema(&self) -> Value {
        city_schema()
    }

    fn execute(&self, arguments: &Value) -> ToolResponse {
        match parse_arguments::<CityArguments>(self.name(), arguments) {
            Ok(args) => self.get_weather_forecast(&args.city),
            Err(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_route_report_single_place() {
        assert_eq!(
            route_report("Helsinki", "Turku", 100.0, &names(&["Salo"])),
            "On the route from Helsinki to Turku, you will pass through: Salo."
        );
    }

    #[test]
    fn test_route_report_several_places() {
        assert_eq!(
            route_report("Tampere", "Rovaniemi", 150.0, &names(&["Jyväskylä", "Oulu", "Kemi"])),
            "On the route from Tampere to Rovaniemi (with stops every 150km), \
             you will pass through: Jyväskylä, Oulu, and Kemi."
        );
    }

    #[test]
    fn test_weather_report() {
        let weather = WeatherReport {
            city: "Tampere".to_string(),
            temperature_celsius: 12.5,
            description: "light rain".to_string(),
        };
        assert_eq!(
            weather_report(&weather),
            "The weather in Tampere is light rain with a temperature of 12.5°C."
        );
    }

    #[test]
    fn test_forecast_report() {
        let days = vec![DailySummary {
            date: "2024-06-01".to_string(),
            min_celsius: 9.5,
            max_celsius: 17.0,
            description: "light rain".to_string(),
            periods: 8,
        }];
        assert_eq!(
            forecast_report("Oulu", &days),
            "Weather forecast for Oulu:\n2024-06-01: light rain, 9.5°C to 17.0°C"
        );
    }

    #[test]
    fn test_error_envelope_shape() {
        let response = ToolResponse::from(Error::input("bad interval")).with_field("start_location", "Tampere");
        let value = response.to_value();
        assert_eq!(value["status"], "error");
        assert_eq!(value["error_message"], "invalid input: bad interval");
        assert_eq!(value["start_location"], "Tampere");
        assert!(value.get("report").is_none());
    }

    #[test]
    fn test_success_envelope_shape() {
        let mut data = Map::new();
        data.insert("places".to_string(), json!(["Salo"]));
        let value = ToolResponse::success("ok", data).to_value();
        assert_eq!(value["status"], "success");
        assert_eq!(value["report"], "ok");
        assert_eq!(value["places"][0], "Salo");
        assert!(value.get("error_message").is_none());
    }
}
