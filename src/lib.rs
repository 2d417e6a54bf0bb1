// Library exports for testing and reusability

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result};

use cache::CachedPoiProvider;
use config::Config;
use services::elevation::OpenElevationClient;
use services::osrm::OsrmClient;
use services::overpass::OverpassClient;
use services::route_synthesizer::clock::TokioClock;
use services::route_synthesizer::RouteSynthesizer;
use std::sync::Arc;

// App state for sharing across the application
pub struct AppState {
    pub synthesizer: RouteSynthesizer,
    /// Present when POI lookups go through the in-memory cache
    pub poi_cache: Option<Arc<CachedPoiProvider>>,
    /// Fixed RNG seed; every request draws a fresh seed when unset
    pub seed: Option<u64>,
}

impl AppState {
    /// Wire the production providers (OSRM, Open-Elevation, Overpass behind
    /// the POI cache) from configuration.
    pub fn from_config(config: &Config) -> Self {
        let timeout = config.provider_timeout();

        let routing = Arc::new(OsrmClient::with_config(
            config.osrm_base_url.clone(),
            config.osrm_profile.clone(),
            timeout,
        ));
        let elevation = Arc::new(OpenElevationClient::with_config(
            config.elevation_api_url.clone(),
            timeout,
        ));
        let overpass = Arc::new(OverpassClient::with_config(
            config.overpass_api_url.clone(),
            timeout,
        ));
        let poi_cache = Arc::new(CachedPoiProvider::new(
            overpass,
            config.poi_cache_ttl,
            config.poi_cache_max_entries,
        ));

        let synthesizer = RouteSynthesizer::new(
            routing,
            elevation,
            poi_cache.clone(),
            Arc::new(TokioClock::new()),
            config.synthesis.clone(),
        );

        AppState {
            synthesizer,
            poi_cache: Some(poi_cache),
            seed: config.seed,
        }
    }
}
