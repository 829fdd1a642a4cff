//! Command-line interface parsing for wxdigest
//!
//! The parsed command line, with `WXDIGEST_*` environment fallbacks, is the whole
//! configuration surface. `Settings::from_cli` validates it once at startup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::data::geocoding::NOMINATIM_BASE_URL;
use crate::data::openmeteo::OPEN_METEO_BASE_URL;
use crate::logging::LogFormat;
use crate::overview::DetailLevel;
use crate::service::DEFAULT_CACHE_TTL_MINUTES;

/// Error types for CLI argument validation
#[derive(Debug, Error, PartialEq)]
pub enum CliError {
    #[error("Invalid latitude: {0}. Must be between -90 and 90")]
    InvalidLatitude(f64),

    #[error("Invalid longitude: {0}. Must be between -180 and 180")]
    InvalidLongitude(f64),

    #[error("Invalid cache TTL: {0} minutes. Must not be negative")]
    InvalidCacheTtl(i64),
}

/// wxdigest - point forecasts compressed into daily weather segments
#[derive(Parser, Debug)]
#[command(name = "wxdigest")]
#[command(about = "Point forecasts from Open-Meteo, compressed into daily weather segments")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory for cached overviews (defaults to the platform cache directory)
    #[arg(long, global = true, env = "WXDIGEST_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Minutes a cached overview stays fresh
    #[arg(long, global = true, env = "WXDIGEST_CACHE_TTL", default_value_t = DEFAULT_CACHE_TTL_MINUTES, allow_negative_numbers = true)]
    pub cache_ttl: i64,

    /// Always fetch from upstream and never write the cache
    #[arg(long, global = true, env = "WXDIGEST_NO_CACHE")]
    pub no_cache: bool,

    /// Open-Meteo forecast endpoint
    #[arg(long, global = true, env = "WXDIGEST_FORECAST_URL", default_value = OPEN_METEO_BASE_URL)]
    pub forecast_url: String,

    /// Nominatim base URL
    #[arg(long, global = true, env = "WXDIGEST_GEOCODING_URL", default_value = NOMINATIM_BASE_URL)]
    pub geocoding_url: String,

    /// Timezone for forecast times; `auto` uses the location's own
    #[arg(long, global = true, env = "WXDIGEST_TIMEZONE", default_value = "auto")]
    pub timezone: String,

    /// Default log level; RUST_LOG takes precedence
    #[arg(long, global = true, env = "WXDIGEST_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Log line format
    #[arg(long, global = true, env = "WXDIGEST_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Fetch the forecast for a point and print its overview
    Forecast {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, value_enum, default_value_t = DetailLevel::Enhanced)]
        detail: DetailLevel,
    },
    /// Build the overview of a saved Open-Meteo response
    Digest {
        /// Path to the JSON response, `-` for stdin
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = DetailLevel::Enhanced)]
        detail: DetailLevel,
    },
    /// Search places by name
    Geocode {
        query: String,
    },
    /// Find the place at a point
    Reverse {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
}

/// Validated runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// `None` when caching is disabled
    pub cache: Option<CacheSettings>,
    pub forecast_url: String,
    pub geocoding_url: String,
    pub timezone: String,
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// `None` means the platform cache directory
    pub dir: Option<PathBuf>,
    pub ttl_minutes: i64,
}

impl Settings {
    /// Creates Settings from parsed CLI arguments, validating coordinates and TTL
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        match &cli.command {
            Command::Forecast { lat, lon, .. } | Command::Reverse { lat, lon } => {
                validate_coordinates(*lat, *lon)?;
            }
            Command::Digest { .. } | Command::Geocode { .. } => {}
        }

        if cli.cache_ttl < 0 {
            return Err(CliError::InvalidCacheTtl(cli.cache_ttl));
        }

        let cache = (!cli.no_cache).then(|| CacheSettings {
            dir: cli.cache_dir.clone(),
            ttl_minutes: cli.cache_ttl,
        });

        Ok(Settings {
            cache,
            forecast_url: cli.forecast_url.clone(),
            geocoding_url: cli.geocoding_url.clone(),
            timezone: cli.timezone.clone(),
            log_level: cli.log_level.clone(),
            log_format: cli.log_format,
        })
    }
}

/// Checks that a point lies on the globe
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), CliError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(CliError::InvalidLatitude(lat));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(CliError::InvalidLongitude(lon));
    }
    Ok(())
}
