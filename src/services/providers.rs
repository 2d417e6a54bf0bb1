//! Contracts of the three external services the synthesizer depends on.
//!
//! The engine only ever talks to these traits, so providers can be swapped
//! (self-hosted OSRM, another elevation API) or scripted in tests.

use crate::error::Result;
use crate::models::{Coordinates, Poi, PoiCategory};
use async_trait::async_trait;

/// A path returned by the street router.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedPath {
    pub coordinates: Vec<Coordinates>,
    pub distance_km: f64,
    pub turn_count: u32,
}

#[async_trait]
pub trait RoutingProvider: Send + Sync {
    /// Route through `waypoints` (at least 2) in order.
    async fn route(&self, waypoints: &[Coordinates]) -> Result<RoutedPath>;

    /// Short identifier used in logs and health output
    fn provider_name(&self) -> &'static str;
}

#[async_trait]
pub trait ElevationProvider: Send + Sync {
    /// One elevation (meters) per input point, in input order.
    async fn elevations(&self, points: &[Coordinates]) -> Result<Vec<f64>>;

    fn provider_name(&self) -> &'static str;
}

#[async_trait]
pub trait PoiProvider: Send + Sync {
    /// POIs of `category` within `radius_meters` of `center`, nearest first.
    async fn find_pois(
        &self,
        center: &Coordinates,
        radius_meters: f64,
        category: PoiCategory,
    ) -> Result<Vec<Poi>>;

    fn provider_name(&self) -> &'static str;
}
