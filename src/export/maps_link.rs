use crate::constants::{MAPS_DIRECTIONS_BASE_URL, MAPS_LINK_MAX_WAYPOINTS, MAPS_LINK_TURN_THRESHOLD_DEG};
use crate::error::{AppError, Result};
use crate::models::Coordinates;
use crate::services::route_synthesizer::geometry::detect_turn_points;

/// Walking-directions deep link that retraces `path` through its major
/// corners. The maps app re-routes between them, so only sharp turns are
/// kept and the waypoint count stays under the app's limit.
pub fn build_maps_link(path: &[Coordinates]) -> Result<String> {
    let (Some(origin), Some(destination)) = (path.first(), path.last()) else {
        return Err(AppError::Export("Route has no coordinates".to_string()));
    };
    if path.len() < 2 {
        return Err(AppError::Export(
            "At least 2 coordinates required for directions".to_string(),
        ));
    }

    let mut url = format!(
        "{}&origin={}&destination={}",
        MAPS_DIRECTIONS_BASE_URL,
        origin.to_lat_lng_string(),
        destination.to_lat_lng_string()
    );

    let corners = detect_turn_points(path, MAPS_LINK_MAX_WAYPOINTS, MAPS_LINK_TURN_THRESHOLD_DEG);
    if !corners.is_empty() {
        let waypoints = corners
            .iter()
            .map(Coordinates::to_lat_lng_string)
            .collect::<Vec<_>>()
            .join("|");
        url.push_str("&waypoints=");
        url.push_str(&urlencoding::encode(&waypoints));
    }

    url.push_str("&travelmode=walking");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> Coordinates {
        Coordinates::new(lat, lng).unwrap()
    }

    #[test]
    fn test_straight_path_has_no_waypoints() {
        let path = vec![coord(35.0, 139.0), coord(35.0, 139.01), coord(35.0, 139.02)];
        let url = build_maps_link(&path).unwrap();

        assert_eq!(
            url,
            "https://www.google.com/maps/dir/?api=1&origin=35,139&destination=35,139.02&travelmode=walking"
        );
    }

    #[test]
    fn test_sharp_corners_become_waypoints() {
        // A square loop: three 90° corners, then back to the start
        let path = vec![
            coord(35.0, 139.0),
            coord(35.0, 139.01),
            coord(35.01, 139.01),
            coord(35.01, 139.0),
            coord(35.0, 139.0),
        ];
        let url = build_maps_link(&path).unwrap();

        assert!(url.contains("&origin=35,139&destination=35,139&"));
        assert!(url.contains("&waypoints=35%2C139.01%7C35.01%2C139.01%7C35.01%2C139&"));
        assert!(url.ends_with("&travelmode=walking"));
    }

    #[test]
    fn test_waypoints_are_capped() {
        // Zig-zag with many sharp corners
        let path: Vec<_> = (0..30)
            .map(|i| coord(35.0 + (i % 2) as f64 * 0.005, 139.0 + i as f64 * 0.001))
            .collect();
        let url = build_maps_link(&path).unwrap();

        let waypoints = url
            .split("&waypoints=")
            .nth(1)
            .and_then(|rest| rest.split('&').next())
            .unwrap();
        assert_eq!(waypoints.matches("%7C").count() + 1, MAPS_LINK_MAX_WAYPOINTS);
    }

    #[test]
    fn test_degenerate_paths_are_rejected() {
        assert!(build_maps_link(&[]).is_err());
        assert!(build_maps_link(&[coord(35.0, 139.0)]).is_err());
    }
}
