//! Great-circle helpers on a spherical Earth, plus the polygon construction
//! used to seed loop requests.

use super::randomness::RandomSource;
use crate::constants::EARTH_RADIUS_KM;
use crate::models::Coordinates;
use std::f64::consts::TAU;

/// Point reached by travelling `distance_km` from `start` along the initial
/// `bearing_deg` (degrees clockwise from north). Longitude is wrapped into
/// `[-180, 180]`.
pub fn destination(start: &Coordinates, distance_km: f64, bearing_deg: f64) -> Coordinates {
    let angular = distance_km / EARTH_RADIUS_KM;
    let lat1 = start.lat.to_radians();
    let lng1 = start.lng.to_radians();
    let bearing = bearing_deg.to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lng2 = lng1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    Coordinates {
        lat: lat2.to_degrees(),
        lng: (lng2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0,
    }
}

/// Initial great-circle bearing from `from` to `to`, in `[0, 360)`.
pub fn bearing(from: &Coordinates, to: &Coordinates) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let y = delta_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();

    let deg = y.atan2(x).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if deg >= 360.0 {
        0.0
    } else {
        deg
    }
}

/// Compress a dense path to at most `max_points` of its sharpest corners.
///
/// An interior point is a corner when the heading change between its
/// incoming and outgoing segments, folded into `[0, 180]`, exceeds
/// `threshold_deg`. The sharpest corners win; the result keeps path order.
pub fn detect_turn_points(path: &[Coordinates], max_points: usize, threshold_deg: f64) -> Vec<Coordinates> {
    if path.len() <= 2 {
        return Vec::new();
    }

    let mut turns: Vec<(usize, f64)> = path
        .windows(3)
        .enumerate()
        .filter_map(|(i, w)| {
            let incoming = bearing(&w[0], &w[1]);
            let outgoing = bearing(&w[1], &w[2]);
            let mut change = (incoming - outgoing).abs();
            if change > 180.0 {
                change = 360.0 - change;
            }
            (change > threshold_deg).then_some((i + 1, change))
        })
        .collect();

    // Stable sort keeps earlier corners ahead on equal severity
    turns.sort_by(|a, b| b.1.total_cmp(&a.1));
    turns.truncate(max_points);
    turns.sort_by_key(|&(index, _)| index);

    turns.into_iter().map(|(index, _)| path[index]).collect()
}

/// Intermediate waypoints for a loop of roughly `total_distance_km` that
/// starts and ends at `start`.
///
/// With one point the loop degenerates to an out-and-back: a single point at
/// half the distance along a random bearing. Otherwise `start` sits on a
/// circle of circumference `total_distance_km` whose center lies along a
/// random bearing, and the remaining `point_count - 1` polygon vertices are
/// spaced evenly around that center.
pub fn generate_loop_waypoints(
    start: &Coordinates,
    total_distance_km: f64,
    point_count: usize,
    rng: &mut dyn RandomSource,
) -> Vec<Coordinates> {
    let center_bearing = rng.bearing();

    if point_count <= 1 {
        return vec![destination(start, total_distance_km / 2.0, center_bearing)];
    }

    let radius_km = total_distance_km / TAU;
    let center = destination(start, radius_km, center_bearing);
    let angle_to_start = (center_bearing + 180.0) % 360.0;
    let step = 360.0 / point_count as f64;

    (1..point_count)
        .map(|i| destination(&center, radius_km, angle_to_start + step * i as f64))
        .collect()
}
