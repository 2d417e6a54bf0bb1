use async_trait::async_trait;
use runroute::config::SynthesisConfig;
use runroute::error::{AppError, Result};
use runroute::models::{Coordinates, Poi, PoiCategory};
use runroute::services::providers::{ElevationProvider, PoiProvider, RoutedPath, RoutingProvider};
use runroute::services::route_synthesizer::clock::Clock;
use runroute::services::route_synthesizer::RouteSynthesizer;
use runroute::AppState;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Clock that only moves when told to. Sleeping advances it instantly.
#[allow(dead_code)]
#[derive(Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(ManualClock::default())
    }

    pub fn advance(&self, duration: Duration) {
        self.now_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.now_ms.load(Ordering::SeqCst))
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// One scripted routing outcome
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum Scripted {
    Route { distance_km: f64, turns: u32 },
    Fail,
}

/// Routing provider that replays a script, then fails once it runs dry.
#[allow(dead_code)]
pub struct FakeRouting {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<Vec<Coordinates>>>,
    latency: Option<(Arc<ManualClock>, Duration)>,
}

#[allow(dead_code)]
impl FakeRouting {
    pub fn new(script: Vec<Scripted>) -> Self {
        FakeRouting {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            latency: None,
        }
    }

    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    /// Every call advances `clock` by `latency`
    pub fn with_latency(mut self, clock: Arc<ManualClock>, latency: Duration) -> Self {
        self.latency = Some((clock, latency));
        self
    }

    pub fn calls(&self) -> Vec<Vec<Coordinates>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RoutingProvider for FakeRouting {
    async fn route(&self, waypoints: &[Coordinates]) -> Result<RoutedPath> {
        self.calls.lock().unwrap().push(waypoints.to_vec());
        if let Some((clock, latency)) = &self.latency {
            clock.advance(*latency);
        }

        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Route { distance_km, turns }) => Ok(RoutedPath {
                coordinates: straight_path(&waypoints[0], 5),
                distance_km,
                turn_count: turns,
            }),
            Some(Scripted::Fail) => Err(AppError::RoutingApi("HTTP 503".to_string())),
            None => Err(AppError::RoutingApi("script exhausted".to_string())),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake-routing"
    }
}

/// Elevation provider returning a fixed terrain shape for any path.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum FakeElevation {
    Flat,
    /// Climbs `rise_m` between every other sample
    Hilly { rise_m: f64 },
    Unavailable,
}

#[async_trait]
impl ElevationProvider for FakeElevation {
    async fn elevations(&self, points: &[Coordinates]) -> Result<Vec<f64>> {
        match self {
            FakeElevation::Flat => Ok(vec![12.0; points.len()]),
            FakeElevation::Hilly { rise_m } => Ok((0..points.len())
                .map(|i| if i % 2 == 0 { 0.0 } else { *rise_m })
                .collect()),
            FakeElevation::Unavailable => {
                Err(AppError::ElevationApi("connection refused".to_string()))
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake-elevation"
    }
}

/// POI provider answering every category with the same nearby points.
#[allow(dead_code)]
pub struct FakePois {
    positions: Vec<Coordinates>,
    queries: Mutex<Vec<PoiCategory>>,
}

#[allow(dead_code)]
impl FakePois {
    pub fn new(positions: Vec<Coordinates>) -> Self {
        FakePois {
            positions,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn queries(&self) -> Vec<PoiCategory> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl PoiProvider for FakePois {
    async fn find_pois(
        &self,
        _center: &Coordinates,
        _radius_meters: f64,
        category: PoiCategory,
    ) -> Result<Vec<Poi>> {
        self.queries.lock().unwrap().push(category);
        Ok(self
            .positions
            .iter()
            .map(|p| Poi::new(*p, category))
            .collect())
    }

    fn provider_name(&self) -> &'static str {
        "fake-pois"
    }
}

/// A start point in central Paris
#[allow(dead_code)]
pub fn start() -> Coordinates {
    Coordinates::new(48.8566, 2.3522).unwrap()
}

/// `points` coordinates heading east from `from`, ~100 m apart
#[allow(dead_code)]
pub fn straight_path(from: &Coordinates, points: usize) -> Vec<Coordinates> {
    (0..points)
        .map(|i| Coordinates::new(from.lat, from.lng + i as f64 * 0.0014).unwrap())
        .collect()
}

#[allow(dead_code)]
pub fn synthesizer(
    routing: Arc<FakeRouting>,
    elevation: FakeElevation,
    pois: Arc<FakePois>,
    clock: Arc<ManualClock>,
) -> RouteSynthesizer {
    RouteSynthesizer::new(
        routing,
        Arc::new(elevation),
        pois,
        clock,
        SynthesisConfig::default(),
    )
}

/// App state over scripted providers with a fixed seed
#[allow(dead_code)]
pub fn test_state(routing: Arc<FakeRouting>) -> Arc<AppState> {
    Arc::new(AppState {
        synthesizer: synthesizer(
            routing,
            FakeElevation::Flat,
            Arc::new(FakePois::empty()),
            ManualClock::new(),
        ),
        poi_cache: None,
        seed: Some(7),
    })
}

/// Check if we should skip real API tests. Public endpoints are only hit
/// when `RUN_REAL_API_TESTS` is set.
#[allow(dead_code)]
pub fn should_skip_real_api_tests() -> bool {
    std::env::var("SKIP_REAL_API_TESTS").is_ok() || std::env::var("RUN_REAL_API_TESTS").is_err()
}
