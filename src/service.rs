//! Cache-aside forecast service
//!
//! Glues the Open-Meteo fetcher, the overview pipeline and the file cache together.

use chrono::Duration;
use thiserror::Error;

use crate::cache::{CacheKey, CacheManager};
use crate::data::{FetchError, ForecastClient, Overview, OverviewError};
use crate::overview::{build_overview, DetailLevel};

/// Default freshness of a cached overview
pub const DEFAULT_CACHE_TTL_MINUTES: i64 = 60;

/// Errors that can occur while serving an overview
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Overview(#[from] OverviewError),
}

/// Serves overviews for a point, backed by an optional cache
#[derive(Debug, Clone)]
pub struct ForecastService {
    client: ForecastClient,
    cache: Option<CacheManager>,
    ttl: Duration,
}

impl ForecastService {
    pub fn new(client: ForecastClient) -> Self {
        Self {
            client,
            cache: None,
            ttl: Duration::minutes(DEFAULT_CACHE_TTL_MINUTES),
        }
    }

    pub fn with_cache(mut self, cache: CacheManager, ttl: Duration) -> Self {
        self.cache = Some(cache);
        self.ttl = ttl;
        self
    }

    /// Returns the overview for a point at the requested detail level
    ///
    /// # Behavior
    /// - A fresh cache entry is returned without contacting upstream
    /// - Otherwise the forecast is fetched, published and cached
    /// - If the fetch fails, an expired cache entry is returned when one exists
    /// - Pipeline errors (malformed payload, invalid wind) are never masked by stale data
    pub async fn overview(
        &self,
        lat: f64,
        lon: f64,
        detail: DetailLevel,
    ) -> Result<Overview, ServiceError> {
        let key = CacheKey::new(lat, lon, detail);

        if let Some(ref cache) = self.cache {
            if let Some(cached) = cache.read::<Overview>(&key) {
                if !cached.is_expired {
                    tracing::debug!(key = %key.file_stem(), "Cache hit");
                    return Ok(cached.data);
                }
            }
        }

        let raw = match self.client.fetch_forecast(lat, lon).await {
            Ok(raw) => raw,
            Err(fetch_error) => {
                if let Some(ref cache) = self.cache {
                    if let Some(cached) = cache.read::<Overview>(&key) {
                        tracing::warn!(
                            error = %fetch_error,
                            cached_at = %cached.cached_at,
                            "Forecast fetch failed, serving stale overview"
                        );
                        return Ok(cached.data);
                    }
                }
                return Err(fetch_error.into());
            }
        };

        let overview = build_overview(raw, detail)?;

        if let Some(ref cache) = self.cache {
            if let Err(e) = cache.write(&key, &overview, self.ttl) {
                tracing::warn!(
                    dir = %cache.dir().display(),
                    error = %e,
                    "Failed to write cache entry"
                );
            }
        }

        Ok(overview)
    }
}
