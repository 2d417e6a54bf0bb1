pub mod debug;
pub mod export;
pub mod synthesize;

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/routes", post(synthesize::synthesize_route))
        .route("/export/gpx", post(export::export_gpx_track))
        .route("/export/maps-link", post(export::export_maps_link))
        .route("/debug/health", get(debug::health_check))
        .with_state(state)
}
