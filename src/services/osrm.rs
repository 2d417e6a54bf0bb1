use crate::constants::{DEFAULT_OSRM_BASE_URL, DEFAULT_OSRM_PROFILE, DEFAULT_PROVIDER_TIMEOUT_SECONDS};
use crate::error::{AppError, Result};
use crate::models::Coordinates;
use crate::services::providers::{RoutedPath, RoutingProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Maneuver types that never count as a turn
const NON_TURN_MANEUVERS: &[&str] = &["depart", "arrive", "new name"];

/// OSRM public demo servers reject requests beyond this many coordinates
const MAX_WAYPOINTS: usize = 100;

#[derive(Clone)]
pub struct OsrmClient {
    client: Client,
    base_url: String,
    profile: String,
    timeout: Duration,
}

impl OsrmClient {
    pub fn new() -> Self {
        Self::with_config(
            DEFAULT_OSRM_BASE_URL.to_string(),
            DEFAULT_OSRM_PROFILE.to_string(),
            Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECONDS),
        )
    }

    pub fn with_config(base_url: String, profile: String, timeout: Duration) -> Self {
        OsrmClient {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            profile,
            timeout,
        }
    }

    fn route_url(&self, waypoints: &[Coordinates]) -> String {
        // Format coordinates as "lng,lat;lng,lat;..."
        let coordinates_str = waypoints
            .iter()
            .map(Coordinates::to_lng_lat_string)
            .collect::<Vec<_>>()
            .join(";");

        format!("{}/{}/{}", self.base_url, self.profile, coordinates_str)
    }
}

impl Default for OsrmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoutingProvider for OsrmClient {
    /// Get a route through the waypoints, with full geometry and maneuver steps
    async fn route(&self, waypoints: &[Coordinates]) -> Result<RoutedPath> {
        if waypoints.len() < 2 {
            return Err(AppError::InvalidRequest(
                "At least 2 waypoints required".to_string(),
            ));
        }
        if waypoints.len() > MAX_WAYPOINTS {
            return Err(AppError::InvalidRequest(format!(
                "Maximum {} waypoints allowed",
                MAX_WAYPOINTS
            )));
        }

        let url = self.route_url(waypoints);

        tracing::debug!(
            waypoints = waypoints.len(),
            profile = %self.profile,
            "OSRM request: {} waypoints, profile {}",
            waypoints.len(), self.profile
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("overview", "full"),
                ("geometries", "geojson"),
                ("steps", "true"),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AppError::RoutingApi(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                status = %status,
                waypoints = waypoints.len(),
                "OSRM HTTP error {}: {}",
                status, error_text
            );
            return Err(AppError::RoutingApi(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: OsrmRouteResponse = response
            .json()
            .await
            .map_err(|e| AppError::RoutingApi(format!("Failed to parse response: {}", e)))?;

        let path = body.into_routed_path()?;
        tracing::debug!(
            distance_km = %format!("{:.2}", path.distance_km),
            turns = path.turn_count,
            path_points = path.coordinates.len(),
            "OSRM response: {:.2}km, {} turns, {} path points",
            path.distance_km, path.turn_count, path.coordinates.len()
        );
        Ok(path)
    }

    fn provider_name(&self) -> &'static str {
        "osrm"
    }
}

/// A maneuver counts as a turn unless it is a departure, an arrival, a mere
/// street-name change, or goes straight on.
pub fn is_turn(maneuver_type: &str, modifier: Option<&str>) -> bool {
    !NON_TURN_MANEUVERS.contains(&maneuver_type) && modifier != Some("straight")
}

fn count_turns(legs: &[OsrmLeg]) -> u32 {
    legs.iter()
        .flat_map(|leg| leg.steps.iter())
        .filter(|step| is_turn(&step.maneuver.maneuver_type, step.maneuver.modifier.as_deref()))
        .count() as u32
}

// OSRM API response types

#[derive(Debug, Deserialize)]
pub(crate) struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64, // meters
    geometry: OsrmGeometry,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>, // [lng, lat] pairs
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    #[serde(default)]
    steps: Vec<OsrmStep>,
}

#[derive(Debug, Deserialize)]
struct OsrmStep {
    maneuver: OsrmManeuver,
}

#[derive(Debug, Deserialize)]
struct OsrmManeuver {
    #[serde(rename = "type")]
    maneuver_type: String,
    #[serde(default)]
    modifier: Option<String>,
}

impl OsrmRouteResponse {
    /// Convert the first route to our format
    pub(crate) fn into_routed_path(self) -> Result<RoutedPath> {
        if self.code != "Ok" {
            return Err(AppError::RoutingApi(format!(
                "OSRM returned {}: {}",
                self.code,
                self.message.unwrap_or_default()
            )));
        }

        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| AppError::RoutingApi("No routes found".to_string()))?;

        let coordinates = route
            .geometry
            .coordinates
            .iter()
            .filter_map(|coord| Coordinates::new(coord[1], coord[0]).ok())
            .collect();

        Ok(RoutedPath {
            coordinates,
            distance_km: route.distance / 1000.0,
            turn_count: count_turns(&route.legs),
        })
    }
}
