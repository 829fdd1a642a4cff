//! Wind speed conversion and Beaufort classification

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::OverviewError;

/// Exclusive upper bounds in m/s for Beaufort classes 0 through 11; anything above is 12
const BEAUFORT_UPPER_BOUNDS: [f64; 12] = [
    0.3, 1.6, 3.4, 5.5, 8.0, 10.8, 13.9, 17.2, 20.8, 24.5, 28.5, 32.7,
];

const KMH_PER_MS: f64 = 3.6;
const MS_PER_MPH: f64 = 0.44704;
const MS_PER_KNOT: f64 = 0.514444;

/// Wind speed units Open-Meteo can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindUnit {
    #[serde(rename = "km/h")]
    Kmh,
    #[serde(rename = "mp/h")]
    Mph,
    #[serde(rename = "kn")]
    Knot,
    #[serde(rename = "m/s")]
    MetersPerSecond,
}

impl WindUnit {
    /// Label as it appears in Open-Meteo's `*_units` blocks
    pub fn label(&self) -> &'static str {
        match self {
            WindUnit::Kmh => "km/h",
            WindUnit::Mph => "mp/h",
            WindUnit::Knot => "kn",
            WindUnit::MetersPerSecond => "m/s",
        }
    }
}

impl fmt::Display for WindUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WindUnit {
    type Err = OverviewError;

    /// Accepts Open-Meteo's unit labels and the request parameter spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "km/h" | "kmh" => Ok(WindUnit::Kmh),
            "mp/h" | "mph" => Ok(WindUnit::Mph),
            "kn" | "kt" | "knot" | "knots" => Ok(WindUnit::Knot),
            "m/s" | "ms" => Ok(WindUnit::MetersPerSecond),
            _ => Err(OverviewError::InvalidMeasurement(format!(
                "unsupported wind speed unit '{}'",
                s
            ))),
        }
    }
}

/// A wind speed with its unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindObservation {
    pub speed: f64,
    pub unit: WindUnit,
}

impl WindObservation {
    pub fn new(speed: f64, unit: WindUnit) -> Self {
        Self { speed, unit }
    }

    /// Speed converted to metres per second
    pub fn meters_per_second(&self) -> f64 {
        match self.unit {
            WindUnit::Kmh => self.speed / KMH_PER_MS,
            WindUnit::Mph => self.speed * MS_PER_MPH,
            WindUnit::Knot => self.speed * MS_PER_KNOT,
            WindUnit::MetersPerSecond => self.speed,
        }
    }

    /// Beaufort class 0-12
    ///
    /// # Returns
    /// * `Err(OverviewError::InvalidMeasurement)` - If the speed is negative or not a number
    pub fn beaufort(&self) -> Result<u8, OverviewError> {
        if self.speed.is_nan() || self.speed < 0.0 {
            return Err(OverviewError::InvalidMeasurement(format!(
                "wind speed must be a non-negative number, got {} {}",
                self.speed, self.unit
            )));
        }
        Ok(beaufort_from_ms(self.meters_per_second()))
    }
}

/// Beaufort class for a non-negative speed in m/s
pub fn beaufort_from_ms(speed: f64) -> u8 {
    BEAUFORT_UPPER_BOUNDS
        .iter()
        .position(|&bound| speed < bound)
        .unwrap_or(BEAUFORT_UPPER_BOUNDS.len()) as u8
}
