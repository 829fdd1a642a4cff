//! Cache module for storing published overviews on disk
//!
//! Entries are keyed by `(lat, lon, detail)` and carry an expiry timestamp.
//! Expired entries are still returned with an `is_expired` flag so the service
//! can serve stale data when the upstream API is unavailable.

mod manager;

pub use manager::{CacheKey, CacheManager, CachedData};
