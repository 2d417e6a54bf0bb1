use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{Coordinates, Poi, PoiCategory};
use crate::services::providers::PoiProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// OSM element selectors (element type, key, value) queried per category
fn category_selectors(category: PoiCategory) -> &'static [(&'static str, &'static str, &'static str)] {
    match category {
        PoiCategory::Scenic => &[
            ("way", "leisure", "park"),
            ("relation", "leisure", "park"),
            ("way", "natural", "water"),
            ("relation", "natural", "water"),
        ],
        PoiCategory::Urban => &[
            ("way", "landuse", "commercial"),
            ("relation", "landuse", "commercial"),
            ("node", "tourism", "attraction"),
            ("way", "leisure", "stadium"),
        ],
        PoiCategory::Proximity => &[("node", "shop", "convenience")],
        PoiCategory::Quiet => &[
            ("node", "amenity", "library"),
            ("way", "amenity", "place_of_worship"),
            ("relation", "leisure", "garden"),
            ("way", "landuse", "forest"),
        ],
        PoiCategory::Waterside => &[
            ("way", "waterway", "river"),
            ("relation", "waterway", "river"),
            ("way", "natural", "water"),
        ],
        PoiCategory::LowTraffic => &[
            ("way", "highway", "cycleway"),
            ("way", "highway", "path"),
            ("way", "highway", "living_street"),
        ],
    }
}

#[derive(Clone)]
pub struct OverpassClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl OverpassClient {
    pub fn new() -> Self {
        Self::with_config(
            DEFAULT_OVERPASS_API_URL.to_string(),
            Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECONDS),
        )
    }

    pub fn with_config(endpoint: String, timeout: Duration) -> Self {
        OverpassClient {
            client: Client::new(),
            endpoint,
            timeout,
        }
    }

    /// Execute a query. Any non-2xx answer fails the lookup; the caller
    /// decides whether to go on without POIs.
    async fn execute_query(&self, query: &str) -> Result<Vec<OverpassElement>> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(format!("data={}", urlencoding::encode(query)))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::OverpassApi("Request timed out".to_string())
                } else {
                    AppError::OverpassApi(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(status = %status, "Overpass returned HTTP {}", status);
            return Err(AppError::OverpassApi(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let api_response: OverpassResponse = response
            .json()
            .await
            .map_err(|e| AppError::OverpassApi(format!("Failed to parse response: {}", e)))?;
        Ok(api_response.elements)
    }
}

impl Default for OverpassClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PoiProvider for OverpassClient {
    async fn find_pois(
        &self,
        center: &Coordinates,
        radius_meters: f64,
        category: PoiCategory,
    ) -> Result<Vec<Poi>> {
        let query = build_query(center, radius_meters, category);
        tracing::debug!(category = %category, "Overpass query: {}", query);

        let elements = self.execute_query(&query).await?;
        let pois = convert_elements_to_pois(elements, center, category);

        tracing::debug!(
            category = %category,
            count = pois.len(),
            radius_m = %format!("{:.0}", radius_meters),
            "Overpass returned {} {} POIs within {:.0}m",
            pois.len(),
            category,
            radius_meters
        );
        Ok(pois)
    }

    fn provider_name(&self) -> &'static str {
        "overpass"
    }
}

/// Overpass QL union of the category's selectors around `center`.
/// Proximity queries only hit nodes, so they skip `center` output.
pub(crate) fn build_query(center: &Coordinates, radius_meters: f64, category: PoiCategory) -> String {
    let mut query_parts = vec![format!("[out:json][timeout:{}];(", OVERPASS_QUERY_TIMEOUT_SECONDS)];

    for (element, key, value) in category_selectors(category) {
        query_parts.push(format!(
            r#"{}["{}"="{}"](around:{},{},{});"#,
            element, key, value, radius_meters, center.lat, center.lng
        ));
    }

    let output = if category.selects_nearest() {
        format!(");out {};", OVERPASS_RESULT_LIMIT)
    } else {
        format!(");out center {};", OVERPASS_RESULT_LIMIT)
    };
    query_parts.push(output);
    query_parts.join("\n")
}

/// Keep elements with a usable position (node lat/lon, or the computed
/// center of ways and relations), nearest to `center` first.
fn convert_elements_to_pois(
    elements: Vec<OverpassElement>,
    center: &Coordinates,
    category: PoiCategory,
) -> Vec<Poi> {
    let mut pois: Vec<Poi> = elements
        .into_iter()
        .filter_map(|elem| {
            let (lat, lon) = match (elem.lat, elem.lon, elem.center) {
                (Some(lat), Some(lon), _) => (lat, lon),
                (_, _, Some(c)) => (c.lat, c.lon),
                _ => return None,
            };
            let position = Coordinates::new(lat, lon).ok()?;

            let mut poi = Poi::new(position, category);
            if let Some(name) = elem.tags.get("name") {
                poi = poi.with_name(name.clone());
            }
            Some(poi)
        })
        .collect();

    pois.sort_by(|a, b| {
        a.position
            .distance_to(center)
            .total_cmp(&b.position.distance_to(center))
    });
    pois
}

// Overpass API response types

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}
