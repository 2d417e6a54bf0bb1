use crate::error::{AppError, Result};
use crate::export::{build_maps_link, export_gpx, gpx::track_name};
use crate::models::{ExportRequest, MapsLinkResponse};
use axum::{
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use time::OffsetDateTime;

/// POST /export/gpx
/// Render a route path as a GPX 1.1 track
pub async fn export_gpx_track(Json(request): Json<ExportRequest>) -> Result<Response> {
    request.validate().map_err(AppError::InvalidRequest)?;

    let gpx = export_gpx(
        &request.coordinates,
        request.distance_km,
        OffsetDateTime::now_utc(),
    )?;

    tracing::debug!(
        points = request.coordinates.len(),
        bytes = gpx.len(),
        "Exported GPX track with {} points",
        request.coordinates.len()
    );

    let disposition = format!(
        "attachment; filename=\"{}.gpx\"",
        track_name(request.distance_km).replace(' ', "")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/gpx+xml".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        gpx,
    )
        .into_response())
}

/// POST /export/maps-link
/// Build a walking-directions deep link through the path's sharpest turns
pub async fn export_maps_link(Json(request): Json<ExportRequest>) -> Result<Json<MapsLinkResponse>> {
    request.validate().map_err(AppError::InvalidRequest)?;

    let url = build_maps_link(&request.coordinates)?;
    Ok(Json(MapsLinkResponse { url }))
}
