//! Core data models for wxdigest
//!
//! This module contains the types shared by the forecast pipeline: typed time keys,
//! hourly and daily records, current conditions, the published overview shapes and
//! the compressed weather segments.

pub mod geocoding;
pub mod openmeteo;

pub use geocoding::{GeocodingClient, Place, PlaceAddress};
pub use openmeteo::{ForecastClient, RawDaily, RawForecast, RawHourly};

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use hashlink::LinkedHashMap;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// WMO weather code as reported by Open-Meteo
pub type WeatherCode = i32;

/// Unit labels of a block, e.g. `"temperature_2m" -> "°C"`, in upstream order
pub type Units = LinkedHashMap<String, String>;

/// Ordered hourly records keyed by timestamp
pub type HourlySeries = LinkedHashMap<Timestamp, HourlySample>;

/// Ordered daily records keyed by date
pub type DailySeries = LinkedHashMap<Day, DailyAggregate>;

/// Compressed segments of one day keyed by their start time
pub type DaySummary = LinkedHashMap<Timestamp, Segment>;

/// Minute-resolution local timestamp in Open-Meteo's `iso8601` format (`2024-07-15T05:30`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Format used on the wire
    pub const FORMAT: &'static str = "%Y-%m-%dT%H:%M";

    /// Parses a timestamp such as `2024-07-15T05:30`
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        NaiveDateTime::parse_from_str(s, Self::FORMAT).map(Self)
    }

    /// The calendar date this timestamp falls on
    pub fn day(&self) -> Day {
        Day(self.0.date())
    }

    /// Hour of day, 0-23
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn as_datetime(&self) -> NaiveDateTime {
        self.0
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Calendar date in `YYYY-MM-DD` form, used to key daily records
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Day(NaiveDate);

impl Day {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    /// Parses a date such as `2024-07-15`
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        NaiveDate::parse_from_str(s, Self::FORMAT).map(Self)
    }

    pub fn as_date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for Day {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for Day {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Both keys travel as plain strings so they can be JSON object keys.
macro_rules! string_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(de::Error::custom)
            }
        }
    };
}

string_serde!(Timestamp);
string_serde!(Day);

/// Forecast values for a single hour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlySample {
    pub temperature_2m: f64,
    pub weather_code: WeatherCode,
    pub rain: f64,
    pub precipitation_probability: f64,
    pub precipitation: f64,
    pub showers: f64,
    pub snowfall: f64,
}

/// Aggregated forecast values for a single day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub weather_code: WeatherCode,
    pub sunrise: Timestamp,
    pub sunset: Timestamp,
    pub uv_index_max: f64,
    pub uv_index_clear_sky_max: f64,
    pub temperature_2m_max: f64,
    pub temperature_2m_min: f64,
    /// Seconds of daylight
    pub daylight_duration: f64,
    /// Seconds of sunshine
    pub sunshine_duration: f64,
}

/// Instantaneous conditions at the requested point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub time: Timestamp,
    /// Length of the averaging window in seconds
    pub interval: i64,
    pub temperature_2m: f64,
    pub weather_code: WeatherCode,
    pub rain: f64,
    pub wind_speed_10m: f64,
    pub wind_direction_10m: f64,
    pub wind_gusts_10m: f64,
    pub pressure_msl: f64,
    pub surface_pressure: f64,
    pub precipitation: f64,
    /// 1 during daylight, 0 at night
    pub is_day: u8,
    pub apparent_temperature: f64,
    pub relative_humidity_2m: f64,
    pub cloud_cover: f64,
    pub snowfall: f64,
    pub showers: f64,
}

/// Location and generation metadata returned alongside every forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastMeta {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub generationtime_ms: f64,
    #[serde(default)]
    pub utc_offset_seconds: i32,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub timezone_abbreviation: String,
    #[serde(default)]
    pub elevation: f64,
}

/// Forecast reshaped into time-keyed records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherOverview {
    #[serde(flatten)]
    pub meta: ForecastMeta,
    pub current_units: Units,
    pub current: CurrentConditions,
    pub hourly_units: Units,
    pub hourly: HourlySeries,
    pub daily_units: Units,
    pub daily: DailySeries,
}

/// A run of consecutive hours of one day collapsed into a single record
///
/// Temperatures come from the day's aggregate; precipitation values come from
/// the hour that founded the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start_time: Timestamp,
    pub weather_code: WeatherCode,
    pub temperature_2m_max: f64,
    pub temperature_2m_min: f64,
    pub precipitation_probability: f64,
    pub precipitation: f64,
    pub showers: f64,
    pub snowfall: f64,
    /// Number of hours merged into this segment, at least 1
    pub arrow_length: u32,
}

impl Segment {
    /// Opens a new segment at the given hour
    pub fn found(start_time: Timestamp, sample: &HourlySample, day: &DailyAggregate) -> Self {
        Self {
            start_time,
            weather_code: sample.weather_code,
            temperature_2m_max: day.temperature_2m_max,
            temperature_2m_min: day.temperature_2m_min,
            precipitation_probability: sample.precipitation_probability,
            precipitation: sample.precipitation,
            showers: sample.showers,
            snowfall: sample.snowfall,
            arrow_length: 1,
        }
    }
}

/// Current conditions annotated with the Beaufort wind class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedCurrent {
    #[serde(flatten)]
    pub conditions: CurrentConditions,
    pub beaufort_wind_scale: u8,
}

/// Daily aggregate together with its compressed hourly summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizedDay {
    #[serde(flatten)]
    pub aggregate: DailyAggregate,
    pub summary: DaySummary,
}

/// Overview with per-day summaries and Beaufort-scaled wind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedOverview {
    #[serde(flatten)]
    pub meta: ForecastMeta,
    pub current_units: Units,
    pub current: EnhancedCurrent,
    pub hourly_units: Units,
    pub hourly: HourlySeries,
    pub daily_units: Units,
    pub daily: LinkedHashMap<Day, SummarizedDay>,
}

/// Published result of the pipeline
///
/// Serialized without a tag so the JSON body is exactly the inner shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Overview {
    // Tried first on deserialization; a plain body lacks `summary` and fails over.
    Enhanced(EnhancedOverview),
    Plain(WeatherOverview),
}

/// What exactly was wrong with an upstream payload
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedData {
    #[error("missing `{0}` block")]
    MissingBlock(&'static str),

    #[error("`{block}` block is missing field `{field}`")]
    MissingField {
        block: &'static str,
        field: &'static str,
    },

    #[error("`{block}.{field}` has {actual} entries, expected {expected} to match `{block}.time`")]
    LengthMismatch {
        block: &'static str,
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("`{block}.{field}[{index}]` is null")]
    NullValue {
        block: &'static str,
        field: &'static str,
        index: usize,
    },

    #[error("`{block}.{field}` holds an unparseable time: {value}")]
    InvalidTime {
        block: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("`{block}.time` is not strictly increasing: {previous} followed by {next}")]
    OutOfOrder {
        block: &'static str,
        previous: String,
        next: String,
    },
}

/// Errors raised by the overview pipeline itself
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverviewError {
    /// The upstream payload does not have the expected shape
    #[error("Malformed upstream data: {0}")]
    MalformedUpstreamData(#[from] MalformedData),

    /// A measurement cannot be converted (negative wind speed, unknown unit)
    #[error("Invalid measurement: {0}")]
    InvalidMeasurement(String),
}

/// Errors that can occur when talking to an upstream HTTP API
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Upstream answered but found nothing for the request
    #[error("Nothing found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_parse_and_display() {
        let ts = Timestamp::parse("2024-07-15T05:30").unwrap();
        assert_eq!(ts.hour(), 5);
        assert_eq!(ts.day(), Day::parse("2024-07-15").unwrap());
        assert_eq!(ts.to_string(), "2024-07-15T05:30");
    }

    #[test]
    fn test_timestamp_rejects_other_formats() {
        assert!(Timestamp::parse("2024-07-15 05:30").is_err());
        assert!(Timestamp::parse("2024-07-15").is_err());
        assert!(Timestamp::parse("not a time").is_err());
    }

    #[test]
    fn test_day_parse_and_display() {
        let day = Day::parse("2024-02-29").unwrap();
        assert_eq!(day.to_string(), "2024-02-29");
        assert!(Day::parse("2023-02-29").is_err());
    }

    #[test]
    fn test_keys_serialize_as_json_object_keys() {
        let mut series = HourlySeries::new();
        series.insert(
            Timestamp::parse("2024-07-15T23:00").unwrap(),
            HourlySample {
                temperature_2m: 15.8,
                weather_code: 0,
                rain: 0.0,
                precipitation_probability: 5.0,
                precipitation: 0.0,
                showers: 0.0,
                snowfall: 0.0,
            },
        );
        series.insert(
            Timestamp::parse("2024-07-15T01:00").unwrap(),
            HourlySample {
                temperature_2m: 14.8,
                weather_code: 3,
                rain: 0.0,
                precipitation_probability: 5.0,
                precipitation: 0.0,
                showers: 0.0,
                snowfall: 0.0,
            },
        );

        let json = serde_json::to_string(&series).expect("Failed to serialize series");
        // Insertion order is kept, not key order
        let late = json.find("2024-07-15T23:00").unwrap();
        let early = json.find("2024-07-15T01:00").unwrap();
        assert!(late < early);

        let back: HourlySeries = serde_json::from_str(&json).expect("Failed to deserialize series");
        let keys: Vec<String> = back.keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["2024-07-15T23:00", "2024-07-15T01:00"]);
    }

    #[test]
    fn test_segment_found_copies_day_temperatures_and_sample_precipitation() {
        let day = DailyAggregate {
            weather_code: 61,
            sunrise: Timestamp::parse("2024-07-15T05:30").unwrap(),
            sunset: Timestamp::parse("2024-07-15T21:15").unwrap(),
            uv_index_max: 7.5,
            uv_index_clear_sky_max: 8.0,
            temperature_2m_max: 24.8,
            temperature_2m_min: 14.0,
            daylight_duration: 56700.0,
            sunshine_duration: 40000.0,
        };
        let sample = HourlySample {
            temperature_2m: 18.0,
            weather_code: 61,
            rain: 0.4,
            precipitation_probability: 70.0,
            precipitation: 0.5,
            showers: 0.1,
            snowfall: 0.0,
        };

        let segment = Segment::found(Timestamp::parse("2024-07-15T10:00").unwrap(), &sample, &day);

        assert_eq!(segment.weather_code, 61);
        assert_eq!(segment.arrow_length, 1);
        assert!((segment.temperature_2m_max - 24.8).abs() < 0.01);
        assert!((segment.temperature_2m_min - 14.0).abs() < 0.01);
        assert!((segment.precipitation_probability - 70.0).abs() < 0.01);
        assert!((segment.precipitation - 0.5).abs() < 0.01);
        assert!((segment.showers - 0.1).abs() < 0.01);
    }

    #[test]
    fn test_malformed_data_messages_name_block_and_lengths() {
        let err = OverviewError::from(MalformedData::LengthMismatch {
            block: "hourly",
            field: "rain",
            expected: 48,
            actual: 47,
        });
        let msg = err.to_string();
        assert!(msg.contains("hourly.rain"));
        assert!(msg.contains("47"));
        assert!(msg.contains("48"));
    }
}
