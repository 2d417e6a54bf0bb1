use super::randomness::RandomSource;
use crate::models::{Coordinates, PreferenceSet};
use crate::services::providers::PoiProvider;
use std::sync::Arc;

/// Turns active preferences into intermediate waypoints by asking the POI
/// provider for one category per preference.
pub struct WaypointMapper {
    pois: Arc<dyn PoiProvider>,
    radius_cap_m: f64,
    max_waypoints: usize,
}

impl WaypointMapper {
    pub fn new(pois: Arc<dyn PoiProvider>, radius_cap_m: f64, max_waypoints: usize) -> Self {
        WaypointMapper {
            pois,
            radius_cap_m,
            max_waypoints,
        }
    }

    /// Search radius for an attempt: half the effective distance, capped
    pub fn search_radius_m(&self, effective_distance_km: f64) -> f64 {
        (effective_distance_km * 1000.0 / 2.0).min(self.radius_cap_m)
    }

    /// One waypoint per preference that maps to a POI category, in
    /// preference order, deduplicated and capped.
    ///
    /// Provider failures and empty results contribute nothing.
    pub async fn map_preferences(
        &self,
        start: &Coordinates,
        effective_distance_km: f64,
        preferences: &PreferenceSet,
        rng: &mut dyn RandomSource,
    ) -> Vec<Coordinates> {
        let radius_m = self.search_radius_m(effective_distance_km);
        let mut selected = Vec::new();

        for preference in preferences.iter() {
            let Some(category) = preference.poi_category() else {
                continue;
            };

            let pois = match self.pois.find_pois(start, radius_m, category).await {
                Ok(pois) => pois,
                Err(e) => {
                    tracing::warn!(
                        category = %category,
                        error = %e,
                        "POI lookup for {} failed, continuing without: {}",
                        category, e
                    );
                    continue;
                }
            };

            if pois.is_empty() {
                tracing::debug!(category = %category, "No {} POIs within {:.0}m", category, radius_m);
                continue;
            }

            let index = if category.selects_nearest() {
                0
            } else {
                rng.index(pois.len())
            };
            selected.push(pois[index].position);
        }

        dedup_and_cap(selected, self.max_waypoints)
    }
}

/// Drop exact-duplicate coordinates (first occurrence wins) and keep at most
/// `max` points.
pub fn dedup_and_cap(points: Vec<Coordinates>, max: usize) -> Vec<Coordinates> {
    let mut unique: Vec<Coordinates> = Vec::with_capacity(points.len().min(max));
    for point in points {
        if unique.len() == max {
            break;
        }
        if !unique.contains(&point) {
            unique.push(point);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use crate::models::{Poi, PoiCategory, Preference};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns `count` POIs per category, nearest first, and records radii.
    struct GridProvider {
        count: usize,
        failing: Option<PoiCategory>,
        radii: Mutex<Vec<(PoiCategory, f64)>>,
    }

    impl GridProvider {
        fn new(count: usize) -> Self {
            GridProvider {
                count,
                failing: None,
                radii: Mutex::new(Vec::new()),
            }
        }

        fn position(category: PoiCategory, i: usize) -> Coordinates {
            let offset = match category {
                PoiCategory::Scenic => 0.0,
                PoiCategory::Urban => 0.1,
                PoiCategory::Proximity => 0.2,
                PoiCategory::Quiet => 0.3,
                PoiCategory::Waterside => 0.4,
                PoiCategory::LowTraffic => 0.5,
            };
            Coordinates::new(35.0 + offset, 139.0 + i as f64 * 0.001).unwrap()
        }
    }

    #[async_trait]
    impl PoiProvider for GridProvider {
        async fn find_pois(
            &self,
            _center: &Coordinates,
            radius_meters: f64,
            category: PoiCategory,
        ) -> Result<Vec<Poi>> {
            self.radii.lock().unwrap().push((category, radius_meters));
            if self.failing == Some(category) {
                return Err(AppError::OverpassApi("timeout".to_string()));
            }
            Ok((0..self.count)
                .map(|i| Poi::new(Self::position(category, i), category))
                .collect())
        }

        fn provider_name(&self) -> &'static str {
            "grid"
        }
    }

    struct Fixed(f64);

    impl RandomSource for Fixed {
        fn unit(&mut self) -> f64 {
            self.0
        }
    }

    fn start() -> Coordinates {
        Coordinates::new(35.0, 139.0).unwrap()
    }

    fn prefs(list: &[Preference]) -> PreferenceSet {
        list.iter().copied().collect()
    }

    #[test]
    fn test_dedup_and_cap() {
        let a = Coordinates::new(1.0, 1.0).unwrap();
        let b = Coordinates::new(2.0, 2.0).unwrap();
        let c = Coordinates::new(3.0, 3.0).unwrap();
        let d = Coordinates::new(4.0, 4.0).unwrap();

        assert_eq!(dedup_and_cap(vec![a, a, b, a, c, d], 3), vec![a, b, c]);
        assert_eq!(dedup_and_cap(vec![a, b], 3), vec![a, b]);
        assert!(dedup_and_cap(vec![], 3).is_empty());
    }

    #[test]
    fn test_search_radius_is_capped() {
        let mapper = WaypointMapper::new(Arc::new(GridProvider::new(1)), 3000.0, 3);
        assert_eq!(mapper.search_radius_m(5.0), 2500.0);
        assert_eq!(mapper.search_radius_m(10.0), 3000.0);
    }

    #[tokio::test]
    async fn test_no_poi_preferences_issue_no_queries() {
        let provider = Arc::new(GridProvider::new(5));
        let mapper = WaypointMapper::new(provider.clone(), 3000.0, 3);

        let points = mapper
            .map_preferences(&start(), 5.0, &prefs(&[Preference::MinimizeTurns]), &mut Fixed(0.5))
            .await;

        assert!(points.is_empty());
        assert!(provider.radii.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_proximity_takes_nearest_others_random() {
        let provider = Arc::new(GridProvider::new(4));
        let mapper = WaypointMapper::new(provider.clone(), 3000.0, 3);

        let points = mapper
            .map_preferences(
                &start(),
                4.0,
                &prefs(&[Preference::Safety, Preference::Scenery]),
                &mut Fixed(0.5),
            )
            .await;

        // Scenery is queried before Safety; 0.5 * 4 picks index 2
        assert_eq!(
            points,
            vec![
                GridProvider::position(PoiCategory::Scenic, 2),
                GridProvider::position(PoiCategory::Proximity, 0),
            ]
        );

        let radii = provider.radii.lock().unwrap();
        assert_eq!(radii[0], (PoiCategory::Scenic, 2000.0));
        assert_eq!(radii[1], (PoiCategory::Proximity, 2000.0));
    }

    #[tokio::test]
    async fn test_caps_at_three_and_survives_failures() {
        let mut provider = GridProvider::new(2);
        provider.failing = Some(PoiCategory::Urban);
        let provider = Arc::new(provider);
        let mapper = WaypointMapper::new(provider.clone(), 3000.0, 3);

        let all = prefs(&[
            Preference::Scenery,
            Preference::Urban,
            Preference::Safety,
            Preference::Quiet,
            Preference::Flat,
            Preference::FewLights,
        ]);
        let points = mapper.map_preferences(&start(), 5.0, &all, &mut Fixed(0.0)).await;

        assert_eq!(
            points,
            vec![
                GridProvider::position(PoiCategory::Scenic, 0),
                GridProvider::position(PoiCategory::Proximity, 0),
                GridProvider::position(PoiCategory::Quiet, 0),
            ]
        );
        // Every POI preference is still queried
        assert_eq!(provider.radii.lock().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_empty_results_contribute_nothing() {
        let provider = Arc::new(GridProvider::new(0));
        let mapper = WaypointMapper::new(provider, 3000.0, 3);

        let points = mapper
            .map_preferences(&start(), 5.0, &prefs(&[Preference::Quiet]), &mut Fixed(0.9))
            .await;
        assert!(points.is_empty());
    }
}
