//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    http::{header::CACHE_CONTROL, HeaderValue},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::api;
use crate::models::AppConfig;
use crate::services::{DisplayDriver, GalleryService, InkMap, SimulatedPanel};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub gallery: Arc<GalleryService>,
    pub config: Arc<AppConfig>,
}

impl FromRef<AppState> for Arc<GalleryService> {
    fn from_ref(state: &AppState) -> Self {
        state.gallery.clone()
    }
}

/// Create application state around an explicit display driver.
pub fn create_app_state_with_driver(
    config: AppConfig,
    driver: Box<dyn DisplayDriver>,
) -> anyhow::Result<AppState> {
    let gallery = GalleryService::from_config(&config, driver)
        .map_err(|e| anyhow::anyhow!("Failed to create gallery: {e}"))?;

    tracing::info!(
        data_dir = %config.data_dir.display(),
        width = gallery.panel().width,
        height = gallery.panel().height,
        "Gallery ready"
    );

    Ok(AppState {
        gallery: Arc::new(gallery),
        config: Arc::new(config),
    })
}

/// Create application state with the simulated panel from config.
pub fn create_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let palette = config
        .build_palette()
        .map_err(|e| anyhow::anyhow!("Invalid palette configuration: {e}"))?;
    let driver = SimulatedPanel::new(config.panel_spec(), config.panel_output_dir())
        .with_inks(InkMap::from_palette(&palette));
    create_app_state_with_driver(config, Box::new(driver))
}

/// Build the API router with all endpoints and middleware.
///
/// This is the core router used by both production and tests.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.max_upload_bytes;

    Router::new()
        // Images
        .route("/api/images", get(api::list_images).post(api::upload_image))
        .route("/api/images/:name", axum::routing::delete(api::delete_image))
        .route("/api/images/:name/thumbnail", get(api::get_thumbnail))
        .route("/api/images/:name/category", put(api::set_image_category))
        .route("/api/images/:name/show", post(api::show_image))
        // Display
        .route("/api/display", get(api::display_status))
        .route("/api/display/clear", post(api::clear_display))
        // Categories
        .route(
            "/api/categories",
            get(api::list_categories).post(api::create_category),
        )
        .route(
            "/api/categories/:name",
            axum::routing::delete(api::delete_category),
        )
        // Vault
        .route("/api/vault/unlock", post(api::unlock))
        .route(
            "/api/vault/:name",
            post(api::hide_category).delete(api::unhide_category),
        )
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Add state and tracing
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        // Listings change with the vault password, so nothing is cacheable
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}
