//! Candidate scoring and the best-so-far selection policy.
//!
//! [`reduce`] is pure: given the current best, a fresh candidate and the
//! request's objectives it returns the new best and whether the search may
//! stop. Everything that needs the network lives on [`CandidateEvaluator`].

use crate::models::{Candidate, Coordinates, Preference, PreferenceSet};
use crate::services::elevation::{elevation_gain, is_flat, sample_for_elevation};
use crate::services::providers::{ElevationProvider, RoutedPath};
use std::sync::Arc;

/// Which preference-driven gates apply during selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionPolicy {
    pub require_flat: bool,
    pub minimize_turns: bool,
    pub flat_gain_per_km_threshold: f64,
}

impl SelectionPolicy {
    pub fn from_preferences(preferences: &PreferenceSet, flat_gain_per_km_threshold: f64) -> Self {
        SelectionPolicy {
            require_flat: preferences.contains(Preference::Flat),
            minimize_turns: preferences.contains(Preference::MinimizeTurns),
            flat_gain_per_km_threshold,
        }
    }

    /// Missing elevation data counts as flat
    pub fn is_flat(&self, candidate: &Candidate) -> bool {
        is_flat(
            candidate.distance_km,
            candidate.elevation_gain_m.unwrap_or(0.0),
            self.flat_gain_per_km_threshold,
        )
    }
}

/// The retained candidate and the distance error recorded for it
#[derive(Debug, Clone, PartialEq)]
pub struct BestSoFar {
    pub candidate: Candidate,
    pub error_km: f64,
}

impl BestSoFar {
    fn new(candidate: Candidate, target_km: f64) -> Self {
        let error_km = candidate.distance_error(target_km);
        BestSoFar { candidate, error_km }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Stop,
}

/// Everything [`reduce`] needs besides the two candidates
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext {
    pub target_km: f64,
    pub tolerance_km: f64,
    pub policy: SelectionPolicy,
    /// False on the final primary attempt
    pub attempts_remain: bool,
}

/// Fold a new candidate into the best-so-far.
///
/// - A hilly candidate under the flat gate only fills an empty slot while
///   attempts remain, and never stops the search.
/// - Under the turn objective a candidate replaces the best when it has
///   strictly fewer turns and a smaller error, or equal turns and a smaller
///   error. Once a candidate is within tolerance it also beats an
///   out-of-tolerance best, and among in-tolerance routes fewer turns win.
///   The search never stops early.
/// - Otherwise the smaller error wins and an in-tolerance candidate stops
///   the search.
pub fn reduce(
    best: Option<BestSoFar>,
    candidate: Candidate,
    ctx: &EvaluationContext,
) -> (BestSoFar, Verdict) {
    let error_km = candidate.distance_error(ctx.target_km);
    let flat = ctx.policy.is_flat(&candidate);

    if ctx.policy.require_flat && !flat && ctx.attempts_remain {
        let best = best.unwrap_or_else(|| BestSoFar::new(candidate, ctx.target_km));
        return (best, Verdict::Continue);
    }

    let within_tolerance = error_km <= ctx.tolerance_km;

    if ctx.policy.minimize_turns {
        let best = match best {
            None => BestSoFar::new(candidate, ctx.target_km),
            Some(current) => {
                let improves = error_km < current.error_km
                    && candidate.turn_count <= current.candidate.turn_count;

                if improves {
                    BestSoFar::new(candidate, ctx.target_km)
                } else if within_tolerance && !(ctx.policy.require_flat && !flat) {
                    if current.error_km > ctx.tolerance_km
                        || candidate.turn_count < current.candidate.turn_count
                    {
                        BestSoFar::new(candidate, ctx.target_km)
                    } else {
                        current
                    }
                } else {
                    current
                }
            }
        };
        return (best, Verdict::Continue);
    }

    let best = match best {
        Some(current) if current.error_km <= error_km => current,
        _ => BestSoFar::new(candidate, ctx.target_km),
    };

    let verdict = if within_tolerance && (!ctx.policy.require_flat || flat) {
        Verdict::Stop
    } else {
        Verdict::Continue
    };
    (best, verdict)
}

/// Turns a routed path into a [`Candidate`], attaching elevation gain.
pub struct CandidateEvaluator {
    elevation: Arc<dyn ElevationProvider>,
    max_samples: usize,
}

impl CandidateEvaluator {
    pub fn new(elevation: Arc<dyn ElevationProvider>, max_samples: usize) -> Self {
        CandidateEvaluator {
            elevation,
            max_samples,
        }
    }

    /// Total climb along `path`, or `None` when the provider fails or
    /// returns nothing. Never fails the attempt.
    pub async fn elevation_gain(&self, path: &[Coordinates]) -> Option<f64> {
        let samples = sample_for_elevation(path, self.max_samples);
        if samples.is_empty() {
            return None;
        }

        match self.elevation.elevations(&samples).await {
            Ok(elevations) if !elevations.is_empty() => Some(elevation_gain(&elevations)),
            Ok(_) => {
                tracing::warn!(
                    samples = samples.len(),
                    "Elevation provider returned no data for {} samples",
                    samples.len()
                );
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Elevation lookup failed, continuing without: {}", e);
                None
            }
        }
    }

    pub async fn build_candidate(&self, routed: RoutedPath, waypoints_used: Vec<Coordinates>) -> Candidate {
        let elevation_gain_m = self.elevation_gain(&routed.coordinates).await;
        Candidate {
            coordinates: routed.coordinates,
            distance_km: routed.distance_km,
            elevation_gain_m,
            turn_count: routed.turn_count,
            waypoints_used,
        }
    }
}
