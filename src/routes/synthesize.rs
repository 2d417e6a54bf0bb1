use crate::constants::MAX_TARGET_DISTANCE_KM;
use crate::error::{AppError, Result};
use crate::export::is_approximate_distance;
use crate::models::{RouteRequest, RouteResponse, SynthesisStatus};
use crate::services::route_synthesizer::randomness::seeded_rng;
use crate::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;
use uuid::Uuid;

/// POST /routes
/// Synthesize a loop or one-way route matching the requested distance
pub async fn synthesize_route(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<RouteResponse>> {
    request.validate().map_err(AppError::InvalidRequest)?;
    if request.target_distance_km > MAX_TARGET_DISTANCE_KM {
        return Err(AppError::InvalidRequest(format!(
            "target_distance_km must not exceed {}",
            MAX_TARGET_DISTANCE_KM
        )));
    }

    tracing::info!(
        lat = request.start.lat,
        lng = request.start.lng,
        distance_km = request.target_distance_km,
        shape = %request.shape,
        "Route request: ({:.4}, {:.4}), {:.1}km, shape={}",
        request.start.lat, request.start.lng, request.target_distance_km, request.shape
    );

    let mut rng = seeded_rng(state.seed);
    let result = state.synthesizer.synthesize(&request, &mut rng).await?;

    let route = match (result.status, result.route) {
        (SynthesisStatus::NoRoute, _) | (_, None) => {
            return Err(AppError::NoRouteFound(format!(
                "no route could be built after {} attempts",
                result.attempts
            )));
        }
        (_, Some(route)) => route,
    };

    Ok(Json(RouteResponse {
        id: Uuid::new_v4(),
        status: result.status,
        approximate_distance: is_approximate_distance(
            route.distance_km,
            request.target_distance_km,
        ),
        attempts: result.attempts,
        route,
    }))
}
