//! Open-Meteo forecast API client
//!
//! This module fetches point forecasts from the Open-Meteo API and deserializes them
//! into the raw columnar payload the overview pipeline starts from. The payload is
//! not validated here; see [`crate::adapter`].

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CurrentConditions, FetchError, ForecastMeta, Units, WeatherCode};

/// Base URL for the Open-Meteo API
pub const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Daily variables requested from Open-Meteo
const DAILY_VARIABLES: &[&str] = &[
    "weather_code",
    "sunrise",
    "sunset",
    "uv_index_max",
    "uv_index_clear_sky_max",
    "temperature_2m_max",
    "temperature_2m_min",
    "daylight_duration",
    "sunshine_duration",
];

/// Hourly variables requested from Open-Meteo
const HOURLY_VARIABLES: &[&str] = &[
    "temperature_2m",
    "weather_code",
    "rain",
    "precipitation_probability",
    "precipitation",
    "showers",
    "snowfall",
];

/// Current-condition variables requested from Open-Meteo
const CURRENT_VARIABLES: &[&str] = &[
    "temperature_2m",
    "weather_code",
    "rain",
    "wind_speed_10m",
    "wind_direction_10m",
    "wind_gusts_10m",
    "pressure_msl",
    "surface_pressure",
    "precipitation",
    "is_day",
    "apparent_temperature",
    "relative_humidity_2m",
    "cloud_cover",
    "snowfall",
    "showers",
];

/// Forecast payload exactly as Open-Meteo returns it
///
/// Every block and column is optional so that a missing one is reported by the
/// adapter with its name instead of surfacing as a generic JSON error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawForecast {
    #[serde(flatten)]
    pub meta: ForecastMeta,
    #[serde(default)]
    pub current_units: Units,
    pub current: Option<CurrentConditions>,
    #[serde(default)]
    pub hourly_units: Units,
    pub hourly: Option<RawHourly>,
    #[serde(default)]
    pub daily_units: Units,
    pub daily: Option<RawDaily>,
}

/// Hourly block: one array per variable, parallel to `time`
///
/// Open-Meteo writes `null` where it has no value, so entries are optional too.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHourly {
    pub time: Option<Vec<String>>,
    pub temperature_2m: Option<Vec<Option<f64>>>,
    pub weather_code: Option<Vec<Option<WeatherCode>>>,
    pub rain: Option<Vec<Option<f64>>>,
    pub precipitation_probability: Option<Vec<Option<f64>>>,
    pub precipitation: Option<Vec<Option<f64>>>,
    pub showers: Option<Vec<Option<f64>>>,
    pub snowfall: Option<Vec<Option<f64>>>,
}

/// Daily block: one array per variable, parallel to `time`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDaily {
    pub time: Option<Vec<String>>,
    pub weather_code: Option<Vec<Option<WeatherCode>>>,
    pub sunrise: Option<Vec<Option<String>>>,
    pub sunset: Option<Vec<Option<String>>>,
    pub uv_index_max: Option<Vec<Option<f64>>>,
    pub uv_index_clear_sky_max: Option<Vec<Option<f64>>>,
    pub temperature_2m_max: Option<Vec<Option<f64>>>,
    pub temperature_2m_min: Option<Vec<Option<f64>>>,
    pub daylight_duration: Option<Vec<Option<f64>>>,
    pub sunshine_duration: Option<Vec<Option<f64>>>,
}

/// Client for fetching forecasts from the Open-Meteo API
#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Client,
    base_url: String,
    timezone: String,
}

impl ForecastClient {
    /// Create a client against the public Open-Meteo endpoint
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(OPEN_METEO_BASE_URL)
    }

    /// Create a client against a custom endpoint (self-hosted instance or test server)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            timezone: "auto".to_string(),
        })
    }

    /// Use a fixed timezone instead of the location's own (`auto`)
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Query parameters for a forecast request
    fn query(&self, lat: f64, lon: f64) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", lat.to_string()),
            ("longitude", lon.to_string()),
            ("daily", DAILY_VARIABLES.join(",")),
            ("hourly", HOURLY_VARIABLES.join(",")),
            ("current", CURRENT_VARIABLES.join(",")),
            ("timezone", self.timezone.clone()),
        ]
    }

    /// Fetch the raw forecast for the given coordinates
    ///
    /// # Arguments
    /// * `lat` - Latitude coordinate
    /// * `lon` - Longitude coordinate
    ///
    /// # Returns
    /// * `Ok(RawForecast)` - The unvalidated upstream payload
    /// * `Err(FetchError)` - If the request fails, upstream answers with an error
    ///   status, or the body is not a forecast
    pub async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<RawForecast, FetchError> {
        tracing::debug!(lat, lon, url = %self.base_url, "Fetching forecast");

        let response = self
            .client
            .get(&self.base_url)
            .query(&self.query(lat, lon))
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), body = %text, "Forecast request rejected");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}
