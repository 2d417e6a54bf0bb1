//! In-process caching of POI lookups.
//!
//! Loop requests around the same start point ask the POI provider the same
//! question on every attempt, so lookups are memoized behind the same
//! [`PoiProvider`](crate::services::providers::PoiProvider) contract.

pub mod memory;

pub use memory::CachedPoiProvider;

use crate::models::{Coordinates, PoiCategory};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Generate a cache key for a POI query
/// Key includes: center coordinates (3 decimal precision), radius (100m buckets), category
pub fn poi_cache_key(center: &Coordinates, radius_meters: f64, category: PoiCategory) -> String {
    let mut hasher = DefaultHasher::new();

    // Round coordinates to 3 decimal places (~100m precision)
    let lat = (center.lat * 1000.0).round() as i64;
    let lng = (center.lng * 1000.0).round() as i64;

    let radius_bucket = (radius_meters / 100.0).round() as i64;

    lat.hash(&mut hasher);
    lng.hash(&mut hasher);
    radius_bucket.hash(&mut hasher);
    category.hash(&mut hasher);

    format!("poi:{}:{:x}", category, hasher.finish())
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub entries: u64,
}
