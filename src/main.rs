//! wxdigest - point forecasts compressed into daily weather segments
//!
//! Every command prints one JSON document to stdout; logs go to stderr.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::Context;
use chrono::Duration;
use clap::Parser;
use serde::Serialize;

use wxdigest::cache::CacheManager;
use wxdigest::cli::{Cli, Command, Settings};
use wxdigest::data::{ForecastClient, GeocodingClient, RawForecast};
use wxdigest::service::ForecastService;
use wxdigest::{build_overview, logging};

/// Builds the forecast service, with the cache unless it is disabled or has no home
fn forecast_service(settings: &Settings) -> anyhow::Result<ForecastService> {
    let client = ForecastClient::with_base_url(&settings.forecast_url)?
        .with_timezone(&settings.timezone);
    let service = ForecastService::new(client);

    let Some(cache_settings) = &settings.cache else {
        return Ok(service);
    };
    let cache = match &cache_settings.dir {
        Some(dir) => Some(CacheManager::with_dir(dir.clone())),
        None => CacheManager::new(),
    };

    Ok(match cache {
        Some(cache) => {
            tracing::debug!(dir = %cache.dir().display(), "Using overview cache");
            service.with_cache(cache, Duration::minutes(cache_settings.ttl_minutes))
        }
        None => {
            tracing::warn!("No cache directory available, caching disabled");
            service
        }
    })
}

/// Reads a saved Open-Meteo response from a file, or stdin for `-`
fn read_payload(path: &Path) -> anyhow::Result<RawForecast> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read forecast from stdin")?;
        buf
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read forecast from {}", path.display()))?
    };
    serde_json::from_str(&text).context("input is not an Open-Meteo forecast response")
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_cli(&cli)?;
    logging::init(&settings.log_level, settings.log_format)?;

    match cli.command {
        Command::Forecast { lat, lon, detail } => {
            let overview = forecast_service(&settings)?
                .overview(lat, lon, detail)
                .await?;
            print_json(&overview)
        }
        Command::Digest { file, detail } => {
            let raw = read_payload(&file)?;
            print_json(&build_overview(raw, detail)?)
        }
        Command::Geocode { query } => {
            let client = GeocodingClient::with_base_url(&settings.geocoding_url)?;
            print_json(&client.search(&query).await?)
        }
        Command::Reverse { lat, lon } => {
            let client = GeocodingClient::with_base_url(&settings.geocoding_url)?;
            print_json(&client.reverse(lat, lon).await?)
        }
    }
}
