//! File-backed cache for published overviews
//!
//! Each entry is a JSON file holding the overview plus its write and expiry times.
//! Expired entries stay readable so a failed upstream fetch can fall back to them.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::overview::DetailLevel;

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Result of reading from cache, including metadata about cache freshness
#[derive(Debug)]
pub struct CachedData<T> {
    pub data: T,
    /// When the data was originally cached
    pub cached_at: DateTime<Utc>,
    pub is_expired: bool,
}

/// Identity of a cached overview: the point and the detail level requested
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheKey {
    pub lat: f64,
    pub lon: f64,
    pub detail: DetailLevel,
}

impl CacheKey {
    pub fn new(lat: f64, lon: f64, detail: DetailLevel) -> Self {
        Self { lat, lon, detail }
    }

    /// File stem for this key
    ///
    /// Coordinates are rounded to 4 decimals (about 11 m), well below the
    /// forecast grid resolution, so nearby requests share an entry.
    pub fn file_stem(&self) -> String {
        format!(
            "forecast_{:.4}_{:.4}_{}",
            grid(self.lat),
            grid(self.lon),
            self.detail.as_str()
        )
    }
}

/// Rounds a coordinate to 4 decimals, folding `-0.0` into `0.0`
fn grid(coordinate: f64) -> f64 {
    (coordinate * 10_000.0).round() / 10_000.0 + 0.0
}

/// Manages reading and writing cached overviews on disk
///
/// Uses an XDG-compliant cache directory (`~/.cache/wxdigest/` on Linux) unless
/// a directory is given explicitly.
#[derive(Debug, Clone)]
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a CacheManager in the platform cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "wxdigest")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Creates a CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    fn cache_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key.file_stem()))
    }

    /// Writes data under `key`, fresh for `ttl`
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err` if directory creation or file writing fails
    pub fn write<T: Serialize>(&self, key: &CacheKey, data: &T, ttl: Duration) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;

        let now = Utc::now();
        let entry = CacheEntry {
            data,
            cached_at: now,
            expires_at: now + ttl,
        };

        let json = serde_json::to_string(&entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        fs::write(self.cache_path(key), json)
    }

    /// Reads the entry stored under `key`
    ///
    /// Returns `None` if the entry doesn't exist or cannot be parsed. Expired entries
    /// are returned with `is_expired = true`.
    pub fn read<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<CachedData<T>> {
        let path = self.cache_path(key);
        let content = fs::read_to_string(&path).ok()?;
        let entry: CacheEntry<T> = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Ignoring unreadable cache entry");
                return None;
            }
        };

        Some(CachedData {
            data: entry.data,
            cached_at: entry.cached_at,
            is_expired: Utc::now() > entry.expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::tests::raw_forecast;
    use crate::data::Overview;
    use crate::overview::build_overview;
    use std::thread;
    use std::time::Duration as StdDuration;
    use tempfile::TempDir;

    fn tokyo() -> CacheKey {
        CacheKey::new(35.6812, 139.7671, DetailLevel::Enhanced)
    }

    fn overview(detail: DetailLevel) -> Overview {
        let raw = raw_forecast(
            &[("2024-07-15T09:00", 2), ("2024-07-15T10:00", 61)],
            &["2024-07-15"],
        );
        build_overview(raw, detail).expect("sample payload should build")
    }

    fn temp_cache() -> (CacheManager, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp directory");
        (CacheManager::with_dir(dir.path().to_path_buf()), dir)
    }

    #[test]
    fn test_file_stem_rounds_coordinates_and_names_detail() {
        let key = CacheKey::new(35.681236, -139.76712, DetailLevel::Plain);
        assert_eq!(key.file_stem(), "forecast_35.6812_-139.7671_plain");

        let nearby = CacheKey::new(35.68124, -139.76709, DetailLevel::Plain);
        assert_eq!(key.file_stem(), nearby.file_stem());

        let enhanced = CacheKey::new(35.681236, -139.76712, DetailLevel::Enhanced);
        assert_ne!(key.file_stem(), enhanced.file_stem());
    }

    #[test]
    fn test_points_either_side_of_zero_share_an_entry() {
        let south_west = CacheKey::new(-0.00001, -0.00004, DetailLevel::Plain);
        let north_east = CacheKey::new(0.00001, 0.00004, DetailLevel::Plain);

        assert_eq!(south_west.file_stem(), "forecast_0.0000_0.0000_plain");
        assert_eq!(south_west.file_stem(), north_east.file_stem());
        assert_eq!(
            CacheKey::new(-0.00006, 0.0, DetailLevel::Plain).file_stem(),
            "forecast_-0.0001_0.0000_plain"
        );
    }

    #[test]
    fn test_entry_file_is_named_after_key() {
        let (cache, dir) = temp_cache();
        cache
            .write(&tokyo(), &overview(DetailLevel::Enhanced), Duration::minutes(60))
            .unwrap();

        let path = dir.path().join("forecast_35.6812_139.7671_enhanced.json");
        let content = fs::read_to_string(&path).expect("entry file should exist");
        assert!(content.contains("\"expires_at\""));
        assert!(content.contains("\"beaufort_wind_scale\""));
    }

    #[test]
    fn test_overviews_survive_a_round_trip_in_their_own_shape() {
        let (cache, _dir) = temp_cache();
        let plain_key = CacheKey::new(35.6812, 139.7671, DetailLevel::Plain);

        let enhanced = overview(DetailLevel::Enhanced);
        let plain = overview(DetailLevel::Plain);
        cache.write(&tokyo(), &enhanced, Duration::minutes(60)).unwrap();
        cache.write(&plain_key, &plain, Duration::minutes(60)).unwrap();

        let read_enhanced: CachedData<Overview> = cache.read(&tokyo()).unwrap();
        let read_plain: CachedData<Overview> = cache.read(&plain_key).unwrap();

        assert!(matches!(read_enhanced.data, Overview::Enhanced(_)));
        assert!(matches!(read_plain.data, Overview::Plain(_)));
        assert_eq!(read_enhanced.data, enhanced);
        assert_eq!(read_plain.data, plain);
        assert!(!read_plain.is_expired);
    }

    #[test]
    fn test_missing_or_corrupt_entry_reads_as_none() {
        let (cache, dir) = temp_cache();
        assert!(cache.read::<Overview>(&tokyo()).is_none());

        fs::write(
            dir.path().join(format!("{}.json", tokyo().file_stem())),
            "{ not json",
        )
        .unwrap();
        assert!(cache.read::<Overview>(&tokyo()).is_none());
    }

    #[test]
    fn test_zero_ttl_entry_is_stale_but_readable() {
        let (cache, _dir) = temp_cache();
        let before = Utc::now();
        cache
            .write(&tokyo(), &overview(DetailLevel::Enhanced), Duration::zero())
            .unwrap();
        thread::sleep(StdDuration::from_millis(10));

        let stale: CachedData<Overview> = cache.read(&tokyo()).expect("stale entry is kept");
        assert!(stale.is_expired);
        assert!(stale.cached_at >= before && stale.cached_at <= Utc::now());
    }

    #[test]
    fn test_write_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("wx").join("overviews");
        let cache = CacheManager::with_dir(nested.clone());

        cache
            .write(&tokyo(), &overview(DetailLevel::Plain), Duration::minutes(5))
            .unwrap();
        assert!(nested.is_dir());
        assert_eq!(cache.dir(), nested.as_path());
    }

    #[test]
    fn test_platform_directory_is_named_after_crate() {
        // None without a home directory, as on some CI runners
        if let Some(cache) = CacheManager::new() {
            assert!(cache.dir().to_string_lossy().contains("wxdigest"));
        }
    }
}
