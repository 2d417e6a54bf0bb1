use runroute::models::Coordinates;
use runroute::services::elevation::OpenElevationClient;
use runroute::services::osrm::OsrmClient;
use runroute::services::providers::{ElevationProvider, RoutingProvider};

mod common;

#[tokio::test]
async fn test_osrm_foot_route() {
    if common::should_skip_real_api_tests() {
        println!("Skipping real API test");
        return;
    }

    let client = OsrmClient::new();

    // Eiffel Tower to Louvre
    let eiffel = Coordinates::new(48.8584, 2.2945).unwrap();
    let louvre = Coordinates::new(48.8606, 2.3376).unwrap();

    let result = client.route(&[eiffel, louvre]).await;
    assert!(result.is_ok(), "OSRM call should succeed: {:?}", result.err());

    let path = result.unwrap();
    assert!(path.coordinates.len() > 2, "Geometry should not be trivial");
    assert!(
        path.distance_km > 2.0 && path.distance_km < 7.0,
        "Distance should be reasonable: got {}km",
        path.distance_km
    );
}

#[tokio::test]
async fn test_osrm_loop_through_waypoints() {
    if common::should_skip_real_api_tests() {
        println!("Skipping real API test");
        return;
    }

    let client = OsrmClient::new();
    let start = Coordinates::new(48.8566, 2.3522).unwrap();
    let via = Coordinates::new(48.8530, 2.3499).unwrap();

    let path = client.route(&[start, via, start]).await.unwrap();

    let first = path.coordinates.first().unwrap();
    let last = path.coordinates.last().unwrap();
    assert!(first.distance_to(last) < 0.2, "Loop should close near the start");
}

#[tokio::test]
async fn test_open_elevation_lookup() {
    if common::should_skip_real_api_tests() {
        println!("Skipping real API test");
        return;
    }

    let client = OpenElevationClient::new();
    let points = vec![
        Coordinates::new(45.8326, 6.8652).unwrap(), // Mont Blanc
        Coordinates::new(48.8566, 2.3522).unwrap(), // Paris
    ];

    let elevations = client.elevations(&points).await.unwrap();
    assert_eq!(elevations.len(), 2);
    assert!(elevations[0] > elevations[1]);
}
