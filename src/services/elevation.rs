use crate::constants::{DEFAULT_ELEVATION_API_URL, DEFAULT_PROVIDER_TIMEOUT_SECONDS};
use crate::error::{AppError, Result};
use crate::models::Coordinates;
use crate::services::providers::ElevationProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for an Open-Elevation compatible lookup endpoint
#[derive(Clone)]
pub struct OpenElevationClient {
    client: Client,
    api_url: String,
    timeout: Duration,
}

impl OpenElevationClient {
    pub fn new() -> Self {
        Self::with_config(
            DEFAULT_ELEVATION_API_URL.to_string(),
            Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECONDS),
        )
    }

    pub fn with_config(api_url: String, timeout: Duration) -> Self {
        OpenElevationClient {
            client: Client::new(),
            api_url,
            timeout,
        }
    }
}

impl Default for OpenElevationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
struct LookupRequest {
    locations: Vec<LookupLocation>,
}

#[derive(Debug, Serialize)]
struct LookupLocation {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    results: Vec<LookupResult>,
}

#[derive(Debug, Deserialize)]
struct LookupResult {
    elevation: f64,
}

#[async_trait]
impl ElevationProvider for OpenElevationClient {
    async fn elevations(&self, points: &[Coordinates]) -> Result<Vec<f64>> {
        if points.is_empty() {
            return Ok(Vec::new());
        }

        let body = LookupRequest {
            locations: points
                .iter()
                .map(|p| LookupLocation {
                    latitude: p.lat,
                    longitude: p.lng,
                })
                .collect(),
        };

        let response = self
            .client
            .post(&self.api_url)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AppError::ElevationApi(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ElevationApi(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let data: LookupResponse = response
            .json()
            .await
            .map_err(|e| AppError::ElevationApi(format!("Failed to parse response: {}", e)))?;

        tracing::debug!(
            requested = points.len(),
            returned = data.results.len(),
            "Elevation lookup: {} points requested, {} returned",
            points.len(),
            data.results.len()
        );

        Ok(data.results.into_iter().map(|r| r.elevation).collect())
    }

    fn provider_name(&self) -> &'static str {
        "open-elevation"
    }
}

/// Downsample a dense path before an elevation lookup.
///
/// Keeps every `ceil(n / max_samples)`-th point and always ends on the
/// path's final point, so the result holds at most `max_samples + 1` points.
pub fn sample_for_elevation(path: &[Coordinates], max_samples: usize) -> Vec<Coordinates> {
    let Some(last) = path.last() else {
        return Vec::new();
    };

    let max_samples = max_samples.max(1);
    let rate = ((path.len() + max_samples - 1) / max_samples).max(1);
    let mut sampled: Vec<Coordinates> = path.iter().step_by(rate).copied().collect();

    if sampled.last() != Some(last) {
        sampled.push(*last);
    }
    sampled
}

/// Total climb: the sum of all positive consecutive differences.
pub fn elevation_gain(elevations: &[f64]) -> f64 {
    elevations
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .filter(|diff| *diff > 0.0)
        .sum()
}

/// A route is flat when it climbs less than `threshold_m_per_km` per km.
/// Zero-length routes are flat.
pub fn is_flat(distance_km: f64, gain_m: f64, threshold_m_per_km: f64) -> bool {
    if distance_km == 0.0 {
        return true;
    }
    gain_m / distance_km < threshold_m_per_km
}
