use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::{request_access, StatusResponse};
use crate::error::ApiError;
use crate::services::GalleryService;

/// Known categories
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryListResponse {
    /// Sorted category names, always including `default`
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub name: String,
}

/// List categories
///
/// Hidden categories are included only when the request carries the vault
/// password.
#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "Visible categories", body = CategoryListResponse)),
    params(("X-Vault-Password" = Option<String>, Header, description = "Vault password")),
    tag = "Categories"
)]
pub async fn list_categories(
    State(gallery): State<Arc<GalleryService>>,
    headers: HeaderMap,
) -> Result<Json<CategoryListResponse>, ApiError> {
    let access = request_access(&gallery, &headers);
    let categories = gallery
        .list_categories(access)?
        .iter()
        .map(ToString::to_string)
        .collect();
    Ok(Json(CategoryListResponse { categories }))
}

/// Create an empty category
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid category name"),
    ),
    tag = "Categories"
)]
pub async fn create_category(
    State(gallery): State<Arc<GalleryService>>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<Response, ApiError> {
    let category = gallery.create_category(&request.name)?;
    Ok((
        StatusCode::CREATED,
        Json(CategoryResponse {
            name: category.to_string(),
        }),
    )
        .into_response())
}

/// Delete a category
///
/// Its images move back to `default`; the images themselves are kept.
#[utoipa::path(
    delete,
    path = "/api/categories/{name}",
    responses(
        (status = 200, description = "Category deleted", body = StatusResponse),
        (status = 400, description = "Invalid category name"),
        (status = 404, description = "Hidden category, vault password required"),
    ),
    params(
        ("name" = String, Path, description = "Category name"),
        ("X-Vault-Password" = Option<String>, Header, description = "Vault password"),
    ),
    tag = "Categories"
)]
pub async fn delete_category(
    State(gallery): State<Arc<GalleryService>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, ApiError> {
    gallery.delete_category(&name, request_access(&gallery, &headers))?;
    Ok(Json(StatusResponse::ok(format!("Deleted category {}", name.trim()))))
}
