//! Stable application-wide constants.
//!
//! Values here are structural invariants, algorithm coefficients, and default
//! fallbacks for env-var-based configuration. They should rarely change.
//! For tuning knobs that benefit from runtime experimentation, see
//! [`SynthesisConfig`](crate::config::SynthesisConfig) instead.

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";

// --- Provider defaults ---

/// Public OSRM demo server. The profile and coordinates are appended per request.
pub const DEFAULT_OSRM_BASE_URL: &str = "https://router.project-osrm.org/route/v1";
/// OSRM profile used for running routes.
pub const DEFAULT_OSRM_PROFILE: &str = "foot";
/// Public Open-Elevation lookup endpoint.
pub const DEFAULT_ELEVATION_API_URL: &str = "https://api.open-elevation.com/api/v1/lookup";
/// Main Overpass API interpreter.
pub const DEFAULT_OVERPASS_API_URL: &str = "https://overpass-api.de/api/interpreter";
/// Per-request timeout applied to every provider call.
pub const DEFAULT_PROVIDER_TIMEOUT_SECONDS: u64 = 15;
/// Server-side timeout embedded in every Overpass QL query.
pub const OVERPASS_QUERY_TIMEOUT_SECONDS: u64 = 25;
/// Maximum elements returned per Overpass category query (`out center N`).
pub const OVERPASS_RESULT_LIMIT: usize = 10;

// --- POI cache defaults ---

/// Default POI cache TTL: 1 hour. Overridden by `POI_CACHE_TTL`.
pub const DEFAULT_POI_CACHE_TTL_SECONDS: u64 = 3_600;
/// Default POI cache capacity. Overridden by `POI_CACHE_MAX_ENTRIES`.
pub const DEFAULT_POI_CACHE_MAX_ENTRIES: u64 = 1_000;

// --- Geometry ---

/// Spherical Earth radius used by the geometry kernel.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// --- HTTP API limits ---

/// Largest target distance the `/routes` endpoint accepts. The engine itself
/// takes any positive distance.
pub const MAX_TARGET_DISTANCE_KM: f64 = 100.0;

// --- Search loop defaults (see `SynthesisConfig`) ---

/// Maximum number of primary search attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
/// Wall-clock budget for the primary search, checked before every attempt.
pub const DEFAULT_TIME_BUDGET_MS: u64 = 10_000;
/// Pause after every primary attempt to stay within provider rate limits.
pub const DEFAULT_ATTEMPT_PAUSE_MS: u64 = 500;
/// Pause after every fallback attempt.
pub const DEFAULT_FALLBACK_PAUSE_MS: u64 = 200;
/// Fraction of the proportional distance correction that is applied.
pub const DEFAULT_SCALE_DAMPING: f64 = 0.8;

// --- Tolerance: clamp(target * fraction, min, max) ---

pub const DEFAULT_TOLERANCE_FRACTION: f64 = 0.1;
pub const DEFAULT_TOLERANCE_MIN_KM: f64 = 0.5;
pub const DEFAULT_TOLERANCE_MAX_KM: f64 = 1.0;

// --- Waypoint construction ---

/// POI search radius never exceeds this, whatever the target distance.
pub const DEFAULT_POI_SEARCH_RADIUS_CAP_M: f64 = 3_000.0;
/// Hard cap on POI waypoints per attempt. More makes the router zig-zag.
pub const DEFAULT_MAX_POI_WAYPOINTS: usize = 3;
/// Polygon vertex count for geometric loops (start plus `n - 1` generated points).
pub const DEFAULT_LOOP_VERTEX_COUNT: usize = 3;
/// After this attempt, geometric loops collapse to a single out-and-back point.
pub const DEFAULT_SIMPLIFY_AFTER_ATTEMPT: u32 = 5;
/// Bearings swept by the deterministic loop fallback.
pub const FALLBACK_BEARINGS_DEG: [f64; 4] = [0.0, 90.0, 180.0, 270.0];

// --- Candidate validity and scoring ---

/// Routes shorter than this are provider noise and are discarded.
pub const DEFAULT_MIN_ROUTE_KM: f64 = 0.05;
/// Fallback routes must be longer than this to be accepted.
pub const DEFAULT_FALLBACK_MIN_ROUTE_KM: f64 = 0.1;
/// A route is flat when its gain per kilometer stays below this.
pub const DEFAULT_FLAT_GAIN_PER_KM_THRESHOLD: f64 = 10.0;
/// Upper bound on points sent to the elevation provider.
pub const DEFAULT_ELEVATION_MAX_SAMPLES: usize = 50;

// --- Export ---

/// Deep links carry at most this many intermediate waypoints.
pub const MAPS_LINK_MAX_WAYPOINTS: usize = 9;
/// Only bearing changes sharper than this survive into a deep link.
pub const MAPS_LINK_TURN_THRESHOLD_DEG: f64 = 60.0;
/// Base URL of the third-party maps directions deep link.
pub const MAPS_DIRECTIONS_BASE_URL: &str = "https://www.google.com/maps/dir/?api=1";
/// Absolute floor (km) of the "approximate distance" warning.
pub const APPROXIMATE_DISTANCE_MIN_KM: f64 = 1.0;
/// Relative part of the "approximate distance" warning.
pub const APPROXIMATE_DISTANCE_FRACTION: f64 = 0.15;
