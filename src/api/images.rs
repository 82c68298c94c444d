use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::{request_access, StatusResponse};
use crate::error::ApiError;
use crate::models::Category;
use crate::services::{GalleryService, ImageSummary};

/// A stored image
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImageResponse {
    /// Storage name (sanitized upload filename without extension)
    pub name: String,
    /// Category name, `default` when unassigned
    pub category: String,
    /// Last write time of the device-ready file
    pub modified: Option<DateTime<Utc>>,
    /// Thumbnail URL
    pub thumbnail_url: String,
}

impl From<ImageSummary> for ImageResponse {
    fn from(summary: ImageSummary) -> Self {
        Self {
            thumbnail_url: format!("/api/images/{}/thumbnail", summary.name),
            category: summary.category.to_string(),
            name: summary.name,
            modified: summary.modified,
        }
    }
}

/// Gallery listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImageListResponse {
    /// Category filter that was applied, if any
    pub category: Option<String>,
    pub images: Vec<ImageResponse>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
    /// Display the image right after storing it
    #[serde(default)]
    pub show: bool,
}

/// Body for assigning an image to a category
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetCategoryRequest {
    /// Category name; `default` clears the assignment
    pub category: String,
}

/// List stored images
///
/// Images in hidden categories are only listed when the request carries the
/// vault password.
#[utoipa::path(
    get,
    path = "/api/images",
    responses(
        (status = 200, description = "Visible images", body = ImageListResponse),
        (status = 400, description = "Invalid category name"),
    ),
    params(
        ("category" = Option<String>, Query, description = "Only list images in this category"),
        ("X-Vault-Password" = Option<String>, Header, description = "Vault password"),
    ),
    tag = "Images"
)]
pub async fn list_images(
    State(gallery): State<Arc<GalleryService>>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Json<ImageListResponse>, ApiError> {
    let access = request_access(&gallery, &headers);
    let filter = query
        .category
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(Category::parse)
        .transpose()?;

    let listing = gallery.list_images(filter.as_ref(), access)?;
    Ok(Json(ImageListResponse {
        category: listing.category.map(|c| c.to_string()),
        images: listing.images.into_iter().map(ImageResponse::from).collect(),
    }))
}

/// Upload a photo
///
/// The raw request body is the image file. It is scaled to the panel,
/// dithered to the six inks and stored as `<name>.bmp`.
#[utoipa::path(
    post,
    path = "/api/images",
    request_body(content = String, description = "Raw image bytes (JPEG, PNG, ...)", content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Image stored", body = ImageResponse),
        (status = 400, description = "Missing filename or undecodable image"),
        (status = 409, description = "Stored, but the display was busy"),
    ),
    params(
        ("filename" = String, Query, description = "Original filename"),
        ("show" = Option<bool>, Query, description = "Display immediately"),
    ),
    tag = "Images"
)]
pub async fn upload_image(
    State(gallery): State<Arc<GalleryService>>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let filename = query
        .filename
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("filename is required".to_string()))?;
    if body.is_empty() {
        return Err(ApiError::BadRequest("empty upload".to_string()));
    }

    tracing::debug!(filename = %filename, bytes = body.len(), show = query.show, "Upload received");

    let summary = gallery.upload(&filename, body.to_vec(), query.show).await?;
    Ok((StatusCode::CREATED, Json(ImageResponse::from(summary))).into_response())
}

/// Delete an image
#[utoipa::path(
    delete,
    path = "/api/images/{name}",
    responses(
        (status = 200, description = "Image deleted (or already absent)", body = StatusResponse),
        (status = 400, description = "Invalid image name"),
        (status = 404, description = "Image is in a hidden category"),
    ),
    params(
        ("name" = String, Path, description = "Image name"),
        ("X-Vault-Password" = Option<String>, Header, description = "Vault password, for images in hidden categories"),
    ),
    tag = "Images"
)]
pub async fn delete_image(
    State(gallery): State<Arc<GalleryService>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, ApiError> {
    gallery.delete(&name, request_access(&gallery, &headers))?;
    Ok(Json(StatusResponse::ok(format!("Deleted {name}"))))
}

/// Get an image thumbnail
#[utoipa::path(
    get,
    path = "/api/images/{name}/thumbnail",
    responses(
        (status = 200, description = "BMP thumbnail", content_type = "image/bmp"),
        (status = 404, description = "No such image"),
    ),
    params(
        ("name" = String, Path, description = "Image name"),
        ("X-Vault-Password" = Option<String>, Header, description = "Vault password, for images in hidden categories"),
    ),
    tag = "Images"
)]
pub async fn get_thumbnail(
    State(gallery): State<Arc<GalleryService>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let bytes = gallery.thumbnail(&name, request_access(&gallery, &headers))?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/bmp"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        bytes,
    )
        .into_response())
}

/// Assign an image to a category
#[utoipa::path(
    put,
    path = "/api/images/{name}/category",
    request_body = SetCategoryRequest,
    responses(
        (status = 200, description = "Category assigned", body = ImageResponse),
        (status = 400, description = "Invalid image or category name"),
        (status = 404, description = "Image or category is hidden"),
    ),
    params(
        ("name" = String, Path, description = "Image name"),
        ("X-Vault-Password" = Option<String>, Header, description = "Vault password, for images in hidden categories"),
    ),
    tag = "Images"
)]
pub async fn set_image_category(
    State(gallery): State<Arc<GalleryService>>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Json(request): Json<SetCategoryRequest>,
) -> Result<Json<ImageResponse>, ApiError> {
    let access = request_access(&gallery, &headers);
    let category = gallery.set_category(&name, &request.category, access)?;
    Ok(Json(ImageResponse::from(ImageSummary {
        name,
        category,
        modified: None,
    })))
}

/// Show an image on the panel
#[utoipa::path(
    post,
    path = "/api/images/{name}/show",
    responses(
        (status = 200, description = "Image displayed", body = StatusResponse),
        (status = 404, description = "No such image"),
        (status = 409, description = "Display busy, try again"),
    ),
    params(
        ("name" = String, Path, description = "Image name"),
        ("X-Vault-Password" = Option<String>, Header, description = "Vault password, for images in hidden categories"),
    ),
    tag = "Display"
)]
pub async fn show_image(
    State(gallery): State<Arc<GalleryService>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, ApiError> {
    let access = request_access(&gallery, &headers);
    gallery.render(&name, access).await?;
    Ok(Json(StatusResponse::ok(format!("Displaying {name}"))))
}
