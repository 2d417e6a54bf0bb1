use crate::constants::*;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub osrm_base_url: String,
    pub osrm_profile: String,
    pub elevation_api_url: String,
    pub overpass_api_url: String,
    pub provider_timeout_seconds: u64,
    pub poi_cache_ttl: u64,
    pub poi_cache_max_entries: u64,
    /// Fixed RNG seed for reproducible searches. Random per request when unset.
    pub seed: Option<u64>,
    pub synthesis: SynthesisConfig,
}

/// Tuning knobs of the route-synthesis engine.
///
/// Defaults reproduce the engine's reference behavior; every field can be
/// overridden through a `SYNTHESIS_*` environment variable.
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    /// Maximum number of primary search attempts
    pub max_attempts: u32,

    /// Wall-clock budget (ms) checked before each attempt
    pub time_budget_ms: u64,

    /// Pause after each primary attempt (ms)
    pub attempt_pause_ms: u64,

    /// Pause after each fallback attempt (ms)
    pub fallback_pause_ms: u64,

    /// Share of the proportional distance correction applied per attempt.
    /// 0.8 means an 80% step towards the target, which avoids oscillation.
    pub scale_damping: f64,

    /// Tolerance = clamp(target * fraction, min, max)
    pub tolerance_fraction: f64,
    pub tolerance_min_km: f64,
    pub tolerance_max_km: f64,

    /// Cap on the POI search radius (meters)
    pub poi_search_radius_cap_m: f64,

    /// Cap on POI waypoints per attempt
    pub max_poi_waypoints: usize,

    /// Vertex count of geometric loops
    pub loop_vertex_count: usize,

    /// Attempts after this one use a single out-and-back point
    pub simplify_after_attempt: u32,

    /// Gain per km (m/km) below which a route is flat
    pub flat_gain_per_km_threshold: f64,

    /// Upper bound on points sent to the elevation provider
    pub elevation_max_samples: usize,

    /// Routes shorter than this (km) are discarded as degenerate
    pub min_route_km: f64,

    /// Fallback routes must be longer than this (km)
    pub fallback_min_route_km: f64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            time_budget_ms: DEFAULT_TIME_BUDGET_MS,
            attempt_pause_ms: DEFAULT_ATTEMPT_PAUSE_MS,
            fallback_pause_ms: DEFAULT_FALLBACK_PAUSE_MS,
            scale_damping: DEFAULT_SCALE_DAMPING,
            tolerance_fraction: DEFAULT_TOLERANCE_FRACTION,
            tolerance_min_km: DEFAULT_TOLERANCE_MIN_KM,
            tolerance_max_km: DEFAULT_TOLERANCE_MAX_KM,
            poi_search_radius_cap_m: DEFAULT_POI_SEARCH_RADIUS_CAP_M,
            max_poi_waypoints: DEFAULT_MAX_POI_WAYPOINTS,
            loop_vertex_count: DEFAULT_LOOP_VERTEX_COUNT,
            simplify_after_attempt: DEFAULT_SIMPLIFY_AFTER_ATTEMPT,
            flat_gain_per_km_threshold: DEFAULT_FLAT_GAIN_PER_KM_THRESHOLD,
            elevation_max_samples: DEFAULT_ELEVATION_MAX_SAMPLES,
            min_route_km: DEFAULT_MIN_ROUTE_KM,
            fallback_min_route_km: DEFAULT_FALLBACK_MIN_ROUTE_KM,
        }
    }
}

/// Read `name` from the environment, falling back to `default` when unset.
fn env_or<T>(name: &str, default: T) -> Result<T, String>
where
    T: FromStr + ToString,
{
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| format!("Invalid {}", name))
}

impl SynthesisConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let config = Self {
            max_attempts: env_or("SYNTHESIS_MAX_ATTEMPTS", defaults.max_attempts)?,
            time_budget_ms: env_or("SYNTHESIS_TIME_BUDGET_MS", defaults.time_budget_ms)?,
            attempt_pause_ms: env_or("SYNTHESIS_ATTEMPT_PAUSE_MS", defaults.attempt_pause_ms)?,
            fallback_pause_ms: env_or("SYNTHESIS_FALLBACK_PAUSE_MS", defaults.fallback_pause_ms)?,
            scale_damping: env_or("SYNTHESIS_SCALE_DAMPING", defaults.scale_damping)?,
            tolerance_fraction: env_or(
                "SYNTHESIS_TOLERANCE_FRACTION",
                defaults.tolerance_fraction,
            )?,
            tolerance_min_km: env_or("SYNTHESIS_TOLERANCE_MIN_KM", defaults.tolerance_min_km)?,
            tolerance_max_km: env_or("SYNTHESIS_TOLERANCE_MAX_KM", defaults.tolerance_max_km)?,
            poi_search_radius_cap_m: env_or(
                "SYNTHESIS_POI_SEARCH_RADIUS_CAP_M",
                defaults.poi_search_radius_cap_m,
            )?,
            max_poi_waypoints: env_or(
                "SYNTHESIS_MAX_POI_WAYPOINTS",
                defaults.max_poi_waypoints,
            )?,
            loop_vertex_count: env_or(
                "SYNTHESIS_LOOP_VERTEX_COUNT",
                defaults.loop_vertex_count,
            )?,
            simplify_after_attempt: env_or(
                "SYNTHESIS_SIMPLIFY_AFTER_ATTEMPT",
                defaults.simplify_after_attempt,
            )?,
            flat_gain_per_km_threshold: env_or(
                "SYNTHESIS_FLAT_GAIN_PER_KM",
                defaults.flat_gain_per_km_threshold,
            )?,
            elevation_max_samples: env_or(
                "SYNTHESIS_ELEVATION_MAX_SAMPLES",
                defaults.elevation_max_samples,
            )?,
            min_route_km: env_or("SYNTHESIS_MIN_ROUTE_KM", defaults.min_route_km)?,
            fallback_min_route_km: env_or(
                "SYNTHESIS_FALLBACK_MIN_ROUTE_KM",
                defaults.fallback_min_route_km,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("SYNTHESIS_MAX_ATTEMPTS must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.scale_damping) {
            return Err("SYNTHESIS_SCALE_DAMPING must be between 0 and 1".to_string());
        }
        if self.tolerance_min_km > self.tolerance_max_km {
            return Err(
                "SYNTHESIS_TOLERANCE_MIN_KM must not exceed SYNTHESIS_TOLERANCE_MAX_KM"
                    .to_string(),
            );
        }
        if self.loop_vertex_count == 0 {
            return Err("SYNTHESIS_LOOP_VERTEX_COUNT must be at least 1".to_string());
        }
        if self.elevation_max_samples == 0 {
            return Err("SYNTHESIS_ELEVATION_MAX_SAMPLES must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    pub fn attempt_pause(&self) -> Duration {
        Duration::from_millis(self.attempt_pause_ms)
    }

    pub fn fallback_pause(&self) -> Duration {
        Duration::from_millis(self.fallback_pause_ms)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let seed = match env::var("SYNTHESIS_SEED") {
            Ok(raw) => Some(raw.parse().map_err(|_| "Invalid SYNTHESIS_SEED")?),
            Err(_) => None,
        };

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            osrm_base_url: env::var("OSRM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OSRM_BASE_URL.to_string()),
            osrm_profile: env::var("OSRM_PROFILE")
                .unwrap_or_else(|_| DEFAULT_OSRM_PROFILE.to_string()),
            elevation_api_url: env::var("ELEVATION_API_URL")
                .unwrap_or_else(|_| DEFAULT_ELEVATION_API_URL.to_string()),
            overpass_api_url: env::var("OVERPASS_API_URL")
                .unwrap_or_else(|_| DEFAULT_OVERPASS_API_URL.to_string()),
            provider_timeout_seconds: env_or(
                "PROVIDER_TIMEOUT_SECONDS",
                DEFAULT_PROVIDER_TIMEOUT_SECONDS,
            )?,
            poi_cache_ttl: env_or("POI_CACHE_TTL", DEFAULT_POI_CACHE_TTL_SECONDS)?,
            poi_cache_max_entries: env_or(
                "POI_CACHE_MAX_ENTRIES",
                DEFAULT_POI_CACHE_MAX_ENTRIES,
            )?,
            seed,
            synthesis: SynthesisConfig::from_env()?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults_match_engine_invariants() {
        let config = SynthesisConfig::default();
        assert_eq!(config.max_attempts, 10);
        assert_eq!(config.time_budget_ms, 10_000);
        assert_eq!(config.attempt_pause_ms, 500);
        assert_eq!(config.fallback_pause_ms, 200);
        assert_eq!(config.scale_damping, 0.8);
        assert_eq!(config.max_poi_waypoints, 3);
        assert_eq!(config.poi_search_radius_cap_m, 3000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_synthesis_config_env_override() {
        env::set_var("SYNTHESIS_MAX_ATTEMPTS", "4");
        env::set_var("SYNTHESIS_TIME_BUDGET_MS", "2500");
        let config = SynthesisConfig::from_env().unwrap();
        env::remove_var("SYNTHESIS_MAX_ATTEMPTS");
        env::remove_var("SYNTHESIS_TIME_BUDGET_MS");

        assert_eq!(config.max_attempts, 4);
        assert_eq!(config.time_budget(), Duration::from_millis(2500));
        assert_eq!(config.attempt_pause_ms, DEFAULT_ATTEMPT_PAUSE_MS);
    }

    #[test]
    #[serial]
    fn test_synthesis_config_rejects_garbage() {
        env::set_var("SYNTHESIS_SCALE_DAMPING", "lots");
        let result = SynthesisConfig::from_env();
        env::remove_var("SYNTHESIS_SCALE_DAMPING");

        assert_eq!(result.unwrap_err(), "Invalid SYNTHESIS_SCALE_DAMPING");
    }

    #[test]
    #[serial]
    fn test_synthesis_config_rejects_inverted_tolerance() {
        env::set_var("SYNTHESIS_TOLERANCE_MIN_KM", "2.0");
        let result = SynthesisConfig::from_env();
        env::remove_var("SYNTHESIS_TOLERANCE_MIN_KM");

        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        env::remove_var("OSRM_PROFILE");
        env::remove_var("SYNTHESIS_SEED");
        env::set_var("PORT", "8081");
        let config = Config::from_env().unwrap();
        env::remove_var("PORT");

        assert_eq!(config.port, 8081);
        assert_eq!(config.osrm_profile, DEFAULT_OSRM_PROFILE);
        assert_eq!(config.seed, None);
        assert_eq!(config.server_address(), format!("{}:8081", config.host));
    }

    #[test]
    #[serial]
    fn test_config_seed() {
        env::set_var("SYNTHESIS_SEED", "42");
        let config = Config::from_env().unwrap();
        env::remove_var("SYNTHESIS_SEED");

        assert_eq!(config.seed, Some(42));
    }
}
