//! Daily forecast client.
//!
//! Geocodes the requested city, pulls a daily forecast for the requested
//! range (trimmed to the provider's horizon), and normalizes each day into
//! a [`ForecastRecord`] with imperial units and the derived outdoor
//! suitability flag.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use model::{ForecastRecord, UserRequest, flags};

use crate::{CollectError, ForecastProvider};

const DEFAULT_GEOCODE_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
/// The provider forecasts at most 16 days out, today included.
const MAX_FORECAST_DAYS: i64 = 16;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Keyless forecast client.
pub struct WeatherClient {
    client: Client,
    geocode_url: String,
    forecast_url: String,
}

impl WeatherClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
        }
    }

    /// Point the client at different geocoding/forecast endpoints.
    pub fn with_endpoints(
        mut self,
        geocode_url: impl Into<String>,
        forecast_url: impl Into<String>,
    ) -> Self {
        self.geocode_url = geocode_url.into();
        self.forecast_url = forecast_url.into();
        self
    }

    async fn geocode(&self, city: &str) -> Result<(f64, f64), CollectError> {
        debug!("geocoding {city}");
        let response = self
            .client
            .get(&self.geocode_url)
            .timeout(REQUEST_TIMEOUT)
            .query(&[
                ("name", city),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollectError::Api(format!("geocoder returned HTTP {status}")));
        }

        let data: Value = response.json().await?;
        let lat = data.pointer("/results/0/latitude").and_then(Value::as_f64);
        let lon = data.pointer("/results/0/longitude").and_then(Value::as_f64);
        match (lat, lon) {
            (Some(lat), Some(lon)) => Ok((lat, lon)),
            _ => Err(CollectError::Geocode(city.to_string())),
        }
    }
}

impl Default for WeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ForecastProvider for WeatherClient {
    async fn fetch_forecast(
        &self,
        request: &UserRequest,
    ) -> Result<HashMap<String, ForecastRecord>, CollectError> {
        let (lat, lon) = self.geocode(&request.city).await?;

        let today = Utc::now().date_naive();
        let (start, end) = clamp_horizon(request.start_date, request.end_date, today);

        let response = self
            .client
            .get(&self.forecast_url)
            .timeout(REQUEST_TIMEOUT)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                (
                    "daily",
                    "temperature_2m_max,temperature_2m_min,weathercode,\
                     precipitation_probability_max,windspeed_10m_max"
                        .to_string(),
                ),
                ("start_date", start.to_string()),
                ("end_date", end.to_string()),
                ("timezone", "auto".to_string()),
                ("temperature_unit", "celsius".to_string()),
                ("windspeed_unit", "kmh".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollectError::Api(format!("forecast returned HTTP {status}")));
        }

        let data: Value = response.json().await?;
        let forecasts = parse_daily(&data);
        info!("forecast covers {} days for {}", forecasts.len(), request.city);
        Ok(forecasts)
    }
}

/// Trim a requested range to what the provider can actually forecast.
/// The range is clamped, never rejected.
fn clamp_horizon(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let horizon = today + chrono::Duration::days(MAX_FORECAST_DAYS - 1);
    let end = end.min(horizon);
    let start = start.min(end);
    (start, end)
}

/// Normalize the provider's parallel daily arrays into per-day records.
fn parse_daily(data: &Value) -> HashMap<String, ForecastRecord> {
    let day = |name: &str, i: usize| -> f64 {
        data.pointer(&format!("/daily/{name}/{i}"))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    };

    let Some(times) = data.pointer("/daily/time").and_then(Value::as_array) else {
        return HashMap::new();
    };

    let mut forecasts = HashMap::new();
    for (i, time) in times.iter().enumerate() {
        let Some(date) = time.as_str() else { continue };
        let code = day("weathercode", i) as u16;
        let precipitation = day("precipitation_probability_max", i);
        let wind_mph = kmh_to_mph(day("windspeed_10m_max", i));
        forecasts.insert(
            date.to_string(),
            ForecastRecord {
                date: date.to_string(),
                temp_min_f: c_to_f(day("temperature_2m_min", i)),
                temp_max_f: c_to_f(day("temperature_2m_max", i)),
                description: flags::weather_description(code).to_string(),
                precipitation_chance: precipitation,
                wind_speed_mph: wind_mph,
                is_suitable_outdoor: flags::is_suitable_outdoor(code, precipitation, wind_mph),
            },
        );
    }
    forecasts
}

fn c_to_f(celsius: f64) -> f64 {
    round1(celsius * 9.0 / 5.0 + 32.0)
}

fn kmh_to_mph(kmh: f64) -> f64 {
    round1(kmh * 0.621371)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_c_to_f() {
        assert_eq!(c_to_f(0.0), 32.0);
        assert_eq!(c_to_f(100.0), 212.0);
        assert_eq!(c_to_f(21.5), 70.7);
    }

    #[test]
    fn test_kmh_to_mph() {
        assert_eq!(kmh_to_mph(0.0), 0.0);
        assert_eq!(kmh_to_mph(100.0), 62.1);
    }

    #[test]
    fn test_clamp_horizon_within_range() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let start = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        assert_eq!(clamp_horizon(start, end, today), (start, end));
    }

    #[test]
    fn test_clamp_horizon_trims_far_end() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let start = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let horizon = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
        assert_eq!(clamp_horizon(start, end, today), (start, horizon));
    }

    #[test]
    fn test_clamp_horizon_range_entirely_beyond() {
        // Whole range past the horizon collapses onto the horizon day
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let start = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 5, 7).unwrap();
        let horizon = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
        assert_eq!(clamp_horizon(start, end, today), (horizon, horizon));
    }

    #[test]
    fn test_parse_daily_two_days() {
        let data = json!({
            "daily": {
                "time": ["2026-03-06", "2026-03-07"],
                "temperature_2m_min": [2.0, 5.0],
                "temperature_2m_max": [10.0, 12.0],
                "weathercode": [1.0, 61.0],
                "precipitation_probability_max": [10.0, 80.0],
                "windspeed_10m_max": [15.0, 30.0]
            }
        });

        let forecasts = parse_daily(&data);
        assert_eq!(forecasts.len(), 2);

        let friday = &forecasts["2026-03-06"];
        assert_eq!(friday.temp_min_f, 35.6);
        assert_eq!(friday.description, "Mainly clear");
        assert!(friday.is_suitable_outdoor);

        let saturday = &forecasts["2026-03-07"];
        assert_eq!(saturday.description, "Slight rain");
        assert!(!saturday.is_suitable_outdoor);
    }

    #[test]
    fn test_parse_daily_missing_block() {
        assert!(parse_daily(&json!({})).is_empty());
    }
}
