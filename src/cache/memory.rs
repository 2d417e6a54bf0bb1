use crate::cache::{poi_cache_key, CacheStats};
use crate::error::Result;
use crate::models::{Coordinates, Poi, PoiCategory};
use crate::services::providers::PoiProvider;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// POI provider decorator backed by moka with TTL and bounded capacity.
/// Only successful lookups are cached; errors always reach the caller.
pub struct CachedPoiProvider {
    inner: Arc<dyn PoiProvider>,
    pois: Cache<String, Arc<Vec<Poi>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedPoiProvider {
    pub fn new(inner: Arc<dyn PoiProvider>, ttl_seconds: u64, max_capacity: u64) -> Self {
        let pois = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        CachedPoiProvider {
            inner,
            pois,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let hit_rate = if hits + misses > 0 {
            (hits as f64 / (hits + misses) as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            hits,
            misses,
            hit_rate,
            entries: self.pois.entry_count(),
        }
    }
}

#[async_trait]
impl PoiProvider for CachedPoiProvider {
    async fn find_pois(
        &self,
        center: &Coordinates,
        radius_meters: f64,
        category: PoiCategory,
    ) -> Result<Vec<Poi>> {
        let key = poi_cache_key(center, radius_meters, category);

        if let Some(cached) = self.pois.get(&key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("POI cache hit: {}", key);
            return Ok((*cached).clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("POI cache miss: {}", key);

        let pois = self.inner.find_pois(center, radius_meters, category).await?;
        self.pois.insert(key, Arc::new(pois.clone())).await;
        Ok(pois)
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}
