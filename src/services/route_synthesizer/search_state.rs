use super::evaluator::BestSoFar;
use crate::config::SynthesisConfig;
use std::time::Duration;

/// Acceptable absolute distance error for a target:
/// a fraction of the target, clamped to a fixed band.
pub fn tolerance_km(target_km: f64, config: &SynthesisConfig) -> f64 {
    (target_km * config.tolerance_fraction).clamp(config.tolerance_min_km, config.tolerance_max_km)
}

/// Damped proportional correction toward the target. Without a usable
/// measurement the request is left unscaled.
pub fn scale_factor(target_km: f64, best_distance_km: Option<f64>, damping: f64) -> f64 {
    match best_distance_km {
        Some(measured) if measured > 0.0 => 1.0 + (target_km / measured - 1.0) * damping,
        _ => 1.0,
    }
}

/// Mutable state of one iterative search, owned by the synthesizer for the
/// duration of a single run.
#[derive(Debug, Clone)]
pub struct SearchState {
    pub attempt_index: u32,
    pub best: Option<BestSoFar>,
    pub started_at: Duration,
    pub deadline: Duration,
    pub scale_factor: f64,
    pub timed_out: bool,
}

impl SearchState {
    pub fn new(started_at: Duration, budget: Duration) -> Self {
        SearchState {
            attempt_index: 0,
            best: None,
            started_at,
            deadline: started_at + budget,
            scale_factor: 1.0,
            timed_out: false,
        }
    }

    /// True once `now` is strictly past the deadline
    pub fn is_expired(&self, now: Duration) -> bool {
        now > self.deadline
    }

    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.started_at)
    }

    /// Advance to the next attempt and recompute the scale factor from the
    /// current best. Returns the effective distance to request.
    pub fn begin_attempt(&mut self, target_km: f64, damping: f64) -> f64 {
        self.attempt_index += 1;
        self.scale_factor = scale_factor(
            target_km,
            self.best.as_ref().map(|b| b.candidate.distance_km),
            damping,
        );
        target_km * self.scale_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candidate;

    fn config() -> SynthesisConfig {
        SynthesisConfig::default()
    }

    fn best(distance_km: f64) -> BestSoFar {
        BestSoFar {
            candidate: Candidate {
                coordinates: vec![],
                distance_km,
                elevation_gain_m: None,
                turn_count: 0,
                waypoints_used: vec![],
            },
            error_km: 0.0,
        }
    }

    #[test]
    fn test_tolerance_band() {
        let cfg = config();
        assert_eq!(tolerance_km(1.0, &cfg), 0.5);
        assert_eq!(tolerance_km(5.0, &cfg), 0.5);
        assert_eq!(tolerance_km(7.0, &cfg), 0.7000000000000001);
        assert_eq!(tolerance_km(10.0, &cfg), 1.0);
        assert_eq!(tolerance_km(42.195, &cfg), 1.0);

        let mut target = 0.1;
        while target <= 42.195 {
            let expected = (target * 0.1_f64).clamp(0.5, 1.0);
            assert_eq!(tolerance_km(target, &cfg), expected);
            target += 0.35;
        }
    }

    #[test]
    fn test_scale_factor() {
        assert_eq!(scale_factor(5.0, None, 0.8), 1.0);
        assert_eq!(scale_factor(5.0, Some(0.0), 0.8), 1.0);
        // Came back 4 km for a 5 km target: ask for more, damped
        assert!((scale_factor(5.0, Some(4.0), 0.8) - 1.2).abs() < 1e-12);
        assert!((scale_factor(5.0, Some(10.0), 0.8) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_begin_attempt_tracks_best() {
        let mut state = SearchState::new(Duration::from_millis(100), Duration::from_secs(10));
        assert_eq!(state.begin_attempt(5.0, 0.8), 5.0);
        assert_eq!(state.attempt_index, 1);

        state.best = Some(best(4.0));
        let effective = state.begin_attempt(5.0, 0.8);
        assert_eq!(state.attempt_index, 2);
        assert!((effective - 6.0).abs() < 1e-9);
        assert!((state.scale_factor - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_deadline_is_strict() {
        let state = SearchState::new(Duration::from_millis(100), Duration::from_millis(10_000));
        assert!(!state.is_expired(Duration::from_millis(10_100)));
        assert!(state.is_expired(Duration::from_millis(10_101)));
        assert_eq!(state.elapsed(Duration::from_millis(600)), Duration::from_millis(500));
    }
}
