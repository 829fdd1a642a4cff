//! Composition of the forecast pipeline
//!
//! `validate -> assemble` always runs; the enhanced shape additionally runs the
//! daily summaries and the Beaufort annotation of current wind.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::adapter::validate;
use crate::assembler::assemble;
use crate::data::{
    EnhancedCurrent, EnhancedOverview, Overview, OverviewError, RawForecast, SummarizedDay,
    WeatherOverview,
};
use crate::summary::summarize;
use crate::wind::{WindObservation, WindUnit};

/// Unit key for current wind speed in `current_units`
const WIND_SPEED_FIELD: &str = "wind_speed_10m";

/// How much derived detail to publish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// Time-keyed hourly and daily records only
    Plain,
    /// Plus per-day summaries and Beaufort-scaled current wind
    #[default]
    Enhanced,
}

impl DetailLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailLevel::Plain => "plain",
            DetailLevel::Enhanced => "enhanced",
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs the pipeline on an already fetched payload
///
/// Any error from validation or wind conversion is returned as is; nothing is
/// published partially.
pub fn build_overview(raw: RawForecast, detail: DetailLevel) -> Result<Overview, OverviewError> {
    let overview = plain_overview(raw)?;
    match detail {
        DetailLevel::Plain => Ok(Overview::Plain(overview)),
        DetailLevel::Enhanced => enhance(overview).map(Overview::Enhanced),
    }
}

/// Validates and reshapes a raw payload
pub fn plain_overview(raw: RawForecast) -> Result<WeatherOverview, OverviewError> {
    Ok(assemble(validate(raw)?))
}

/// Adds daily summaries and the Beaufort class of current wind
pub fn enhance(overview: WeatherOverview) -> Result<EnhancedOverview, OverviewError> {
    let unit: WindUnit = overview
        .current_units
        .get(WIND_SPEED_FIELD)
        .ok_or_else(|| {
            OverviewError::InvalidMeasurement(format!(
                "current_units.{} is not declared",
                WIND_SPEED_FIELD
            ))
        })?
        .parse()?;
    let beaufort_wind_scale =
        WindObservation::new(overview.current.wind_speed_10m, unit).beaufort()?;

    let mut summaries = summarize(&overview);
    let daily = overview
        .daily
        .into_iter()
        .map(|(day, aggregate)| {
            let summary = summaries.remove(&day).unwrap_or_default();
            (day, SummarizedDay { aggregate, summary })
        })
        .collect();

    Ok(EnhancedOverview {
        meta: overview.meta,
        current_units: overview.current_units,
        current: EnhancedCurrent {
            conditions: overview.current,
            beaufort_wind_scale,
        },
        hourly_units: overview.hourly_units,
        hourly: overview.hourly,
        daily_units: overview.daily_units,
        daily,
    })
}
