//! Zips validated columns into time-keyed records
//!
//! Upstream arrays are already chronological, so records are inserted in array
//! order and never re-sorted.

use crate::adapter::{DailyColumns, HourlyColumns, ValidatedForecast};
use crate::data::{DailyAggregate, DailySeries, HourlySample, HourlySeries, WeatherOverview};

/// Builds the plain overview from a validated payload
pub fn assemble(forecast: ValidatedForecast) -> WeatherOverview {
    WeatherOverview {
        meta: forecast.meta,
        current_units: forecast.current_units,
        current: forecast.current,
        hourly_units: forecast.hourly_units,
        hourly: hourly_series(&forecast.hourly),
        daily_units: forecast.daily_units,
        daily: daily_series(&forecast.daily),
    }
}

/// One record per hour, keyed by its timestamp
pub(crate) fn hourly_series(columns: &HourlyColumns) -> HourlySeries {
    let mut series = HourlySeries::with_capacity(columns.time.len());
    for (i, time) in columns.time.iter().enumerate() {
        series.insert(
            *time,
            HourlySample {
                temperature_2m: columns.temperature_2m[i],
                weather_code: columns.weather_code[i],
                rain: columns.rain[i],
                precipitation_probability: columns.precipitation_probability[i],
                precipitation: columns.precipitation[i],
                showers: columns.showers[i],
                snowfall: columns.snowfall[i],
            },
        );
    }
    series
}

/// One record per day, keyed by its date
pub(crate) fn daily_series(columns: &DailyColumns) -> DailySeries {
    let mut series = DailySeries::with_capacity(columns.time.len());
    for (i, day) in columns.time.iter().enumerate() {
        series.insert(
            *day,
            DailyAggregate {
                weather_code: columns.weather_code[i],
                sunrise: columns.sunrise[i],
                sunset: columns.sunset[i],
                uv_index_max: columns.uv_index_max[i],
                uv_index_clear_sky_max: columns.uv_index_clear_sky_max[i],
                temperature_2m_max: columns.temperature_2m_max[i],
                temperature_2m_min: columns.temperature_2m_min[i],
                daylight_duration: columns.daylight_duration[i],
                sunshine_duration: columns.sunshine_duration[i],
            },
        );
    }
    series
}
