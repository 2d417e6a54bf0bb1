//! Hand-off formats for a synthesized route: a GPX track for watches and
//! fitness apps, and a deep link into a maps application.

pub mod gpx;
pub mod maps_link;

pub use gpx::export_gpx;
pub use maps_link::build_maps_link;

use crate::constants::{APPROXIMATE_DISTANCE_FRACTION, APPROXIMATE_DISTANCE_MIN_KM};

/// Whether the distance missed the target by enough to warn the runner:
/// more than 1 km or 15% of the target, whichever is larger.
pub fn is_approximate_distance(distance_km: f64, target_km: f64) -> bool {
    let allowed = APPROXIMATE_DISTANCE_MIN_KM.max(target_km * APPROXIMATE_DISTANCE_FRACTION);
    (distance_km - target_km).abs() > allowed
}
