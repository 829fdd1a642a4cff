//! Validation of raw Open-Meteo payloads
//!
//! Upstream blocks are columnar: one array per variable, parallel to a shared `time`
//! array. A missing or misaligned column would silently shift values onto the wrong
//! hour once the columns are zipped, so every column is checked against `time`
//! here and the time keys are parsed and checked for strict ordering.

use crate::data::{
    CurrentConditions, Day, ForecastMeta, MalformedData, OverviewError, RawDaily, RawForecast,
    RawHourly, Timestamp, Units, WeatherCode,
};

/// Hourly block with every column present and aligned to `time`
///
/// Only `validate` builds these, so the assembler may index every column by the
/// position of a time key.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyColumns {
    pub(crate) time: Vec<Timestamp>,
    pub(crate) temperature_2m: Vec<f64>,
    pub(crate) weather_code: Vec<WeatherCode>,
    pub(crate) rain: Vec<f64>,
    pub(crate) precipitation_probability: Vec<f64>,
    pub(crate) precipitation: Vec<f64>,
    pub(crate) showers: Vec<f64>,
    pub(crate) snowfall: Vec<f64>,
}

/// Daily block with every column present and aligned to `time`
#[derive(Debug, Clone, PartialEq)]
pub struct DailyColumns {
    pub(crate) time: Vec<Day>,
    pub(crate) weather_code: Vec<WeatherCode>,
    pub(crate) sunrise: Vec<Timestamp>,
    pub(crate) sunset: Vec<Timestamp>,
    pub(crate) uv_index_max: Vec<f64>,
    pub(crate) uv_index_clear_sky_max: Vec<f64>,
    pub(crate) temperature_2m_max: Vec<f64>,
    pub(crate) temperature_2m_min: Vec<f64>,
    pub(crate) daylight_duration: Vec<f64>,
    pub(crate) sunshine_duration: Vec<f64>,
}

/// A forecast payload that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedForecast {
    pub meta: ForecastMeta,
    pub current_units: Units,
    pub current: CurrentConditions,
    pub hourly_units: Units,
    pub hourly: HourlyColumns,
    pub daily_units: Units,
    pub daily: DailyColumns,
}

/// Validates the shape of a raw payload
///
/// # Returns
/// * `Ok(ValidatedForecast)` - Every column present, aligned and time-ordered
/// * `Err(OverviewError::MalformedUpstreamData)` - Naming the first problem found
pub fn validate(raw: RawForecast) -> Result<ValidatedForecast, OverviewError> {
    let current = raw.current.ok_or(MalformedData::MissingBlock("current"))?;
    let hourly = validate_hourly(raw.hourly.ok_or(MalformedData::MissingBlock("hourly"))?)?;
    let daily = validate_daily(raw.daily.ok_or(MalformedData::MissingBlock("daily"))?)?;

    tracing::trace!(
        hours = hourly.time.len(),
        days = daily.time.len(),
        "Forecast payload validated"
    );

    Ok(ValidatedForecast {
        meta: raw.meta,
        current_units: raw.current_units,
        current,
        hourly_units: raw.hourly_units,
        hourly,
        daily_units: raw.daily_units,
        daily,
    })
}

fn validate_hourly(block: RawHourly) -> Result<HourlyColumns, MalformedData> {
    const BLOCK: &str = "hourly";

    let time = block.time.ok_or(MalformedData::MissingField {
        block: BLOCK,
        field: "time",
    })?;
    let time = parse_times(BLOCK, "time", time, Timestamp::parse)?;
    ensure_increasing(BLOCK, &time)?;
    let len = time.len();

    Ok(HourlyColumns {
        temperature_2m: column(BLOCK, "temperature_2m", block.temperature_2m, len)?,
        weather_code: column(BLOCK, "weather_code", block.weather_code, len)?,
        rain: column(BLOCK, "rain", block.rain, len)?,
        precipitation_probability: column(
            BLOCK,
            "precipitation_probability",
            block.precipitation_probability,
            len,
        )?,
        precipitation: column(BLOCK, "precipitation", block.precipitation, len)?,
        showers: column(BLOCK, "showers", block.showers, len)?,
        snowfall: column(BLOCK, "snowfall", block.snowfall, len)?,
        time,
    })
}

fn validate_daily(block: RawDaily) -> Result<DailyColumns, MalformedData> {
    const BLOCK: &str = "daily";

    let time = block.time.ok_or(MalformedData::MissingField {
        block: BLOCK,
        field: "time",
    })?;
    let time = parse_times(BLOCK, "time", time, Day::parse)?;
    ensure_increasing(BLOCK, &time)?;
    let len = time.len();

    let sunrise = column(BLOCK, "sunrise", block.sunrise, len)?;
    let sunset = column(BLOCK, "sunset", block.sunset, len)?;

    Ok(DailyColumns {
        weather_code: column(BLOCK, "weather_code", block.weather_code, len)?,
        sunrise: parse_times(BLOCK, "sunrise", sunrise, Timestamp::parse)?,
        sunset: parse_times(BLOCK, "sunset", sunset, Timestamp::parse)?,
        uv_index_max: column(BLOCK, "uv_index_max", block.uv_index_max, len)?,
        uv_index_clear_sky_max: column(
            BLOCK,
            "uv_index_clear_sky_max",
            block.uv_index_clear_sky_max,
            len,
        )?,
        temperature_2m_max: column(BLOCK, "temperature_2m_max", block.temperature_2m_max, len)?,
        temperature_2m_min: column(BLOCK, "temperature_2m_min", block.temperature_2m_min, len)?,
        daylight_duration: column(BLOCK, "daylight_duration", block.daylight_duration, len)?,
        sunshine_duration: column(BLOCK, "sunshine_duration", block.sunshine_duration, len)?,
        time,
    })
}

/// Requires a column to be present, as long as the block's `time` array and free of nulls
///
/// A null would leave a hole in the record for that hour or day, so it is rejected
/// rather than filled with a made-up value.
fn column<T>(
    block: &'static str,
    field: &'static str,
    values: Option<Vec<Option<T>>>,
    expected: usize,
) -> Result<Vec<T>, MalformedData> {
    let values = values.ok_or(MalformedData::MissingField { block, field })?;
    if values.len() != expected {
        return Err(MalformedData::LengthMismatch {
            block,
            field,
            expected,
            actual: values.len(),
        });
    }
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| value.ok_or(MalformedData::NullValue { block, field, index }))
        .collect()
}

fn parse_times<T>(
    block: &'static str,
    field: &'static str,
    values: Vec<String>,
    parse: impl Fn(&str) -> Result<T, chrono::ParseError>,
) -> Result<Vec<T>, MalformedData> {
    values
        .into_iter()
        .map(|value| parse(&value).map_err(|_| MalformedData::InvalidTime { block, field, value }))
        .collect()
}

fn ensure_increasing<T: Ord + ToString>(
    block: &'static str,
    keys: &[T],
) -> Result<(), MalformedData> {
    match keys.windows(2).find(|pair| pair[0] >= pair[1]) {
        Some(pair) => Err(MalformedData::OutOfOrder {
            block,
            previous: pair[0].to_string(),
            next: pair[1].to_string(),
        }),
        None => Ok(()),
    }
}
