//! OpenWeatherMap adapter and forecast aggregation.

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::config::WeatherConfig;
use crate::error::{Error, Result};
use crate::traits::WeatherProvider;

const SERVICE: &str = "OpenWeatherMap";

/// Current conditions for a city.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub city: String,
    pub temperature_celsius: f64,
    pub description: String,
}

/// One forecast period (OpenWeatherMap uses three-hour steps).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPeriod {
    /// Calendar date of the period, `YYYY-MM-DD` (UTC).
    pub date: String,
    pub temp_min_celsius: f64,
    pub temp_max_celsius: f64,
    pub description: String,
}

/// Aggregate of all forecast periods falling on one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: String,
    pub min_celsius: f64,
    pub max_celsius: f64,
    /// Most frequent description of the day; ties go to the earliest.
    pub description: String,
    pub periods: usize,
}

/// Buckets `periods` by date, keeping dates in first-seen order.
pub fn daily_summaries(periods: &[ForecastPeriod]) -> Vec<DailySummary> {
    let mut days: Vec<(&str, Vec<&ForecastPeriod>)> = Vec::new();
    for period in periods {
        match days.iter_mut().find(|(date, _)| *date == period.date) {
            Some((_, bucket)) => bucket.push(period),
            None => days.push((period.date.as_str(), vec![period])),
        }
    }

    days.into_iter()
        .map(|(date, bucket)| DailySummary {
            date: date.to_string(),
            min_celsius: bucket
                .iter()
                .map(|p| p.temp_min_celsius)
                .fold(f64::INFINITY, f64::min),
            max_celsius: bucket
                .iter()
                .map(|p| p.temp_max_celsius)
                .fold(f64::NEG_INFINITY, f64::max),
            description: most_common(bucket.iter().map(|p| p.description.as_str())),
            periods: bucket.len(),
        })
        .collect()
}

fn most_common<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_string()).unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    config: WeatherConfig,
    client: Client,
}

impl OpenWeatherClient {
    pub fn new(config: WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn get(&self, endpoint: &str, city: &str) -> Result<Response> {
        let key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::configuration(SERVICE, "OPENWEATHERMAP_API_KEY is not set"))?;
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint);

        tracing::debug!(endpoint, city, "requesting weather");
        // the key travels in the query string; keep it out of error messages
        let response = self
            .client
            .get(url)
            .query(&[("q", city), ("appid", key), ("units", "metric")])
            .send()
            .map_err(|err| Error::Http(err.without_url()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| body.trim().chars().take(200).collect());
        tracing::debug!(%status, %message, "OpenWeatherMap returned an error");

        match status {
            StatusCode::NOT_FOUND => Err(Error::not_found(format!("weather for '{}'", city))),
            StatusCode::UNAUTHORIZED => Err(Error::configuration(SERVICE, "API key was rejected (HTTP 401)")),
            _ => Err(Error::provider(
                SERVICE,
                format!("HTTP {}: {}", status.as_u16(), message),
            )),
        }
    }
}

impl WeatherProvider for OpenWeatherClient {
    fn current_weather(&self, city: &str) -> Result<WeatherReport> {
        let body: CurrentResponse = self
            .get("weather", city)?
            .json()
            .map_err(|err| Error::Http(err.without_url()))?;

        let temperature_celsius = body
            .main
            .and_then(|main| main.temp)
            .ok_or_else(|| Error::provider(SERVICE, format!("temperature data not available for {}", city)))?;
        let description = body
            .weather
            .into_iter()
            .next()
            .and_then(|condition| condition.description)
            .unwrap_or_else(|| "N/A".to_string());
        let city = body
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| title_case(city));

        tracing::info!(%city, temperature_celsius, "current weather fetched");
        Ok(WeatherReport {
            city,
            temperature_celsius,
            description,
        })
    }

    fn forecast(&self, city: &str) -> Result<Vec<ForecastPeriod>> {
        let body: ForecastResponse = self
            .get("forecast", city)?
            .json()
            .map_err(|err| Error::Http(err.without_url()))?;

        let periods: Vec<ForecastPeriod> = body
            .list
            .into_iter()
            .filter_map(|entry| {
                let date = entry.dt_txt.get(..10)?.to_string();
                let main = entry.main?;
                let temp_min = main.temp_min.or(main.temp)?;
                let temp_max = main.temp_max.or(main.temp)?;
                let description = entry
                    .weather
                    .into_iter()
                    .next()
                    .and_then(|condition| condition.description)
                    .unwrap_or_else(|| "N/A".to_string());
                Some(ForecastPeriod {
                    date,
                    temp_min_celsius: temp_min,
                    temp_max_celsius: temp_max,
                    description,
                })
            })
            .collect();

        if periods.is_empty() {
            return Err(Error::provider(SERVICE, format!("no forecast data returned for {}", city)));
        }

        tracing::info!(city, periods = periods.len(), "forecast fetched");
        Ok(periods)
    }
}

/// Capitalizes the first letter of every word: "new york" -> "New York".
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    name: Option<String>,
    main: Option<MainReadings>,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    #[serde(default)]
    dt_txt: String,
    main: Option<MainReadings>,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: Option<f64>,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: Option<String>,
}
