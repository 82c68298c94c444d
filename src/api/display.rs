use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::StatusResponse;
use crate::error::ApiError;
use crate::services::GalleryService;

/// Panel geometry and whether a refresh is in progress
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DisplayStatusResponse {
    pub width: u32,
    pub height: u32,
    pub busy: bool,
}

/// Get display status
#[utoipa::path(
    get,
    path = "/api/display",
    responses((status = 200, description = "Display status", body = DisplayStatusResponse)),
    tag = "Display"
)]
pub async fn display_status(State(gallery): State<Arc<GalleryService>>) -> Json<DisplayStatusResponse> {
    let panel = gallery.panel();
    Json(DisplayStatusResponse {
        width: panel.width,
        height: panel.height,
        busy: gallery.is_display_busy(),
    })
}

/// Blank the panel to white
#[utoipa::path(
    post,
    path = "/api/display/clear",
    responses(
        (status = 200, description = "Display cleared", body = StatusResponse),
        (status = 409, description = "Display busy, try again"),
    ),
    tag = "Display"
)]
pub async fn clear_display(
    State(gallery): State<Arc<GalleryService>>,
) -> Result<Json<StatusResponse>, ApiError> {
    gallery.clear_display().await?;
    Ok(Json(StatusResponse::ok("Display cleared")))
}
