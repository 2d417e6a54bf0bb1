pub mod clock;
pub mod evaluator;
pub mod geometry;
pub mod randomness;
pub mod search_state;
mod waypoint_mapper;

use crate::config::SynthesisConfig;
use crate::constants::FALLBACK_BEARINGS_DEG;
use crate::error::{AppError, Result};
use crate::models::{
    Candidate, Coordinates, RouteRequest, RouteShape, SynthesisResult, SynthesisStatus,
};
use crate::services::providers::{ElevationProvider, PoiProvider, RoutingProvider};
use std::sync::Arc;

use clock::Clock;
use evaluator::{reduce, CandidateEvaluator, EvaluationContext, SelectionPolicy, Verdict};
use randomness::RandomSource;
use search_state::{tolerance_km, SearchState};
use waypoint_mapper::WaypointMapper;

/// Closed-loop search that turns a [`RouteRequest`] into routing calls until
/// a returned path lands within tolerance of the target distance.
pub struct RouteSynthesizer {
    routing: Arc<dyn RoutingProvider>,
    evaluator: CandidateEvaluator,
    waypoint_mapper: WaypointMapper,
    clock: Arc<dyn Clock>,
    config: SynthesisConfig,
}

impl RouteSynthesizer {
    pub fn new(
        routing: Arc<dyn RoutingProvider>,
        elevation: Arc<dyn ElevationProvider>,
        pois: Arc<dyn PoiProvider>,
        clock: Arc<dyn Clock>,
        config: SynthesisConfig,
    ) -> Self {
        let evaluator = CandidateEvaluator::new(elevation, config.elevation_max_samples);
        let waypoint_mapper = WaypointMapper::new(
            pois,
            config.poi_search_radius_cap_m,
            config.max_poi_waypoints,
        );

        RouteSynthesizer {
            routing,
            evaluator,
            waypoint_mapper,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    pub fn routing_provider_name(&self) -> &'static str {
        self.routing.provider_name()
    }

    /// Run one synthesis. Only invalid requests are errors; provider
    /// failures degrade into fewer candidates and, at worst, a `NoRoute`
    /// outcome.
    pub async fn synthesize(
        &self,
        request: &RouteRequest,
        rng: &mut dyn RandomSource,
    ) -> Result<SynthesisResult> {
        request.validate().map_err(AppError::InvalidRequest)?;

        if request.is_direct() {
            if let Some(destination) = request.explicit_destination {
                return Ok(self.synthesize_direct(&request.start, &destination).await);
            }
        }

        let target_km = request.target_distance_km;
        let tolerance = tolerance_km(target_km, &self.config);
        let policy = SelectionPolicy::from_preferences(
            &request.preferences,
            self.config.flat_gain_per_km_threshold,
        );

        tracing::info!(
            target_km = %format!("{:.2}", target_km),
            tolerance_km = %format!("{:.2}", tolerance),
            shape = %request.shape,
            preferences = request.preferences.len(),
            avoid_repetition = request.avoid_repetition,
            "Synthesizing {} route: target {:.2}km (tolerance {:.2}km)",
            request.shape, target_km, tolerance
        );

        let mut state = SearchState::new(self.clock.now(), self.config.time_budget());

        while state.attempt_index < self.config.max_attempts {
            let now = self.clock.now();
            if state.is_expired(now) {
                tracing::warn!(
                    attempts = state.attempt_index,
                    elapsed_ms = state.elapsed(now).as_millis() as u64,
                    "Time budget exhausted after {} attempts, keeping best so far",
                    state.attempt_index
                );
                state.timed_out = true;
                break;
            }

            let effective_km = state.begin_attempt(target_km, self.config.scale_damping);
            let attempt = state.attempt_index;
            let waypoints = self.build_waypoints(request, attempt, effective_km, rng).await;

            tracing::debug!(
                attempt,
                effective_km = %format!("{:.2}", effective_km),
                scale_factor = %format!("{:.3}", state.scale_factor),
                waypoints = waypoints.len(),
                "Attempt {}/{}: requesting {:.2}km through {} waypoints",
                attempt, self.config.max_attempts, effective_km, waypoints.len()
            );

            if let Some(candidate) = self.route_candidate(waypoints, self.config.min_route_km).await {
                let error_km = candidate.distance_error(target_km);
                tracing::info!(
                    attempt,
                    distance_km = %format!("{:.2}", candidate.distance_km),
                    error_km = %format!("{:.2}", error_km),
                    turns = candidate.turn_count,
                    gain_m = ?candidate.elevation_gain_m,
                    "Attempt {} returned {:.2}km (error {:.2}km, {} turns)",
                    attempt, candidate.distance_km, error_km, candidate.turn_count
                );

                let ctx = EvaluationContext {
                    target_km,
                    tolerance_km: tolerance,
                    policy,
                    attempts_remain: attempt < self.config.max_attempts,
                };
                let (best, verdict) = reduce(state.best.take(), candidate, &ctx);
                state.best = Some(best);

                if verdict == Verdict::Stop {
                    tracing::info!(attempt, "Route within tolerance found on attempt {}", attempt);
                    break;
                }
            }

            self.clock.sleep(self.config.attempt_pause()).await;
        }

        let attempts = state.attempt_index;
        let mut route = state.best.map(|b| b.candidate);

        if route.is_none() && request.shape == RouteShape::Loop {
            route = self.cardinal_fallback(&request.start, target_km).await;
        }

        let result = match route {
            None => {
                tracing::warn!(attempts, "No route found after {} attempts and fallback", attempts);
                SynthesisResult::no_route(attempts)
            }
            Some(route) => {
                let status = if state.timed_out {
                    SynthesisStatus::TimedOut
                } else {
                    SynthesisStatus::Converged
                };
                tracing::info!(
                    attempts,
                    distance_km = %format!("{:.2}", route.distance_km),
                    status = ?status,
                    "Synthesis finished: {:.2}km after {} attempts ({:?})",
                    route.distance_km, attempts, status
                );
                SynthesisResult {
                    status,
                    route: Some(route),
                    attempts,
                }
            }
        };

        Ok(result)
    }

    /// One routing call straight to the given destination. No scaling, no
    /// retries.
    async fn synthesize_direct(&self, start: &Coordinates, destination: &Coordinates) -> SynthesisResult {
        tracing::info!("Routing directly to the requested destination");

        match self
            .route_candidate(vec![*start, *destination], self.config.min_route_km)
            .await
        {
            Some(route) => SynthesisResult {
                status: SynthesisStatus::Converged,
                route: Some(route),
                attempts: 0,
            },
            None => SynthesisResult::no_route(0),
        }
    }

    /// Full waypoint list for one attempt
    async fn build_waypoints(
        &self,
        request: &RouteRequest,
        attempt: u32,
        effective_km: f64,
        rng: &mut dyn RandomSource,
    ) -> Vec<Coordinates> {
        let start = request.start;
        let pois = self
            .waypoint_mapper
            .map_preferences(&start, effective_km, &request.preferences, rng)
            .await;

        match request.shape {
            RouteShape::Loop if !pois.is_empty() && !request.avoid_repetition => {
                let mut waypoints = Vec::with_capacity(pois.len() + 2);
                waypoints.push(start);
                waypoints.extend(pois);
                waypoints.push(start);
                waypoints
            }
            RouteShape::Loop => {
                let vertex_count = self.loop_vertex_count(attempt, request.avoid_repetition);
                let generated =
                    geometry::generate_loop_waypoints(&start, effective_km, vertex_count, rng);

                let mut waypoints = Vec::with_capacity(generated.len() + 2);
                waypoints.push(start);
                waypoints.extend(generated);
                waypoints.push(start);
                waypoints
            }
            RouteShape::OneWay => {
                let destination = geometry::destination(&start, effective_km, rng.bearing());

                let mut waypoints = Vec::with_capacity(pois.len() + 2);
                waypoints.push(start);
                waypoints.extend(pois);
                waypoints.push(destination);
                waypoints
            }
        }
    }

    /// Polygon loops need repetition avoidance; late attempts simplify to an
    /// out-and-back to raise the odds of any route at all.
    fn loop_vertex_count(&self, attempt: u32, avoid_repetition: bool) -> usize {
        if attempt > self.config.simplify_after_attempt || !avoid_repetition {
            1
        } else {
            self.config.loop_vertex_count
        }
    }

    /// Route through `waypoints` and score the result. Provider failures and
    /// degenerate paths shorter than `min_km` yield no candidate.
    async fn route_candidate(&self, waypoints: Vec<Coordinates>, min_km: f64) -> Option<Candidate> {
        let routed = match self.routing.route(&waypoints).await {
            Ok(routed) => routed,
            Err(e) => {
                tracing::warn!(
                    provider = self.routing.provider_name(),
                    error = %e,
                    "Routing call failed: {}",
                    e
                );
                return None;
            }
        };

        if routed.distance_km < min_km {
            tracing::warn!(
                distance_km = %format!("{:.3}", routed.distance_km),
                "Discarding degenerate route of {:.3}km",
                routed.distance_km
            );
            return None;
        }

        Some(self.evaluator.build_candidate(routed, waypoints).await)
    }

    /// Deterministic last resort for loops: out-and-back along each cardinal
    /// bearing until one routes.
    async fn cardinal_fallback(&self, start: &Coordinates, target_km: f64) -> Option<Candidate> {
        tracing::warn!("Random search produced no route, sweeping cardinal bearings");

        for bearing in FALLBACK_BEARINGS_DEG {
            let turnaround = geometry::destination(start, target_km / 2.0, bearing);
            let waypoints = vec![*start, turnaround, *start];

            match self.route_candidate(waypoints, self.config.min_route_km).await {
                Some(candidate) if candidate.distance_km > self.config.fallback_min_route_km => {
                    tracing::info!(
                        bearing,
                        distance_km = %format!("{:.2}", candidate.distance_km),
                        "Fallback succeeded at bearing {}°: {:.2}km",
                        bearing, candidate.distance_km
                    );
                    return Some(candidate);
                }
                _ => {
                    tracing::debug!(bearing, "Fallback bearing {}° produced no route", bearing);
                }
            }

            self.clock.sleep(self.config.fallback_pause()).await;
        }

        None
    }
}
