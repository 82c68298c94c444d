use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::display_driver::DriverError;
use crate::services::metadata_store::StoreError;

/// Message returned for every failed vault unlock, whatever the cause
pub const UNLOCK_FAILED_MESSAGE: &str = "Incorrect vault password";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Gallery(#[from] GalleryError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Gallery(e.into())
    }
}

/// Failures of the upload pipeline
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Could not decode image: {0}")]
    Decode(String),

    #[error("Image has no pixels: {width}x{height}")]
    DegenerateImage { width: u32, height: u32 },

    #[error("Image encode error: {0}")]
    Encode(String),
}

/// Errors surfaced by gallery operations
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("Could not decode image: {0}")]
    Decode(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Display is busy, try again later")]
    DeviceBusy,

    #[error("{}", UNLOCK_FAILED_MESSAGE)]
    Auth,

    #[error("Invalid image name: {0:?}")]
    InvalidName(String),

    #[error("Invalid category name: {0:?}")]
    InvalidCategory(String),

    #[error("The default category cannot be hidden")]
    ReservedCategory,

    #[error("Image processing error: {0}")]
    Process(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Metadata error: {0}")]
    Store(StoreError),

    #[error("Display error: {0}")]
    Driver(#[from] DriverError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<ProcessError> for GalleryError {
    fn from(e: ProcessError) -> Self {
        match e {
            ProcessError::Decode(_) | ProcessError::DegenerateImage { .. } => {
                GalleryError::Decode(e.to_string())
            }
            ProcessError::Encode(_) => GalleryError::Process(e.to_string()),
        }
    }
}

impl From<StoreError> for GalleryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ReservedCategory => GalleryError::ReservedCategory,
            other => GalleryError::Store(other),
        }
    }
}

impl From<tokio::task::JoinError> for GalleryError {
    fn from(e: tokio::task::JoinError) -> Self {
        GalleryError::Task(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Gallery(e) => (gallery_status(e), e.to_string()),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        if status.is_server_error() {
            tracing::error!(error = %message, "Request failed");
        }

        let body = Json(json!({
            "status": status.as_u16(),
            "error": message,
        }));

        (status, body).into_response()
    }
}

fn gallery_status(e: &GalleryError) -> StatusCode {
    match e {
        GalleryError::Decode(_)
        | GalleryError::InvalidName(_)
        | GalleryError::InvalidCategory(_)
        | GalleryError::ReservedCategory => StatusCode::BAD_REQUEST,
        GalleryError::NotFound(_) => StatusCode::NOT_FOUND,
        GalleryError::DeviceBusy => StatusCode::CONFLICT,
        GalleryError::Auth => StatusCode::FORBIDDEN,
        GalleryError::Process(_)
        | GalleryError::Config(_)
        | GalleryError::Store(_)
        | GalleryError::Driver(_)
        | GalleryError::Io(_)
        | GalleryError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
