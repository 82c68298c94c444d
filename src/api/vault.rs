use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::request_access;
use crate::api::StatusResponse;
use crate::error::ApiError;
use crate::services::GalleryService;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UnlockRequest {
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UnlockResponse {
    pub unlocked: bool,
    /// Hidden categories, now visible to requests carrying the password
    pub hidden: Vec<String>,
}

/// Check the vault password
///
/// Access is per request: send the same password in `X-Vault-Password` on
/// later requests to see hidden categories.
#[utoipa::path(
    post,
    path = "/api/vault/unlock",
    request_body = UnlockRequest,
    responses(
        (status = 200, description = "Password accepted", body = UnlockResponse),
        (status = 403, description = "Incorrect password"),
    ),
    tag = "Vault"
)]
pub async fn unlock(
    State(gallery): State<Arc<GalleryService>>,
    Json(request): Json<UnlockRequest>,
) -> Result<Json<UnlockResponse>, ApiError> {
    let access = gallery.unlock(&request.password)?;
    let hidden = gallery
        .hidden_categories(access)?
        .iter()
        .map(ToString::to_string)
        .collect();
    Ok(Json(UnlockResponse {
        unlocked: access.is_unlocked(),
        hidden,
    }))
}

/// Hide a category in the vault
#[utoipa::path(
    post,
    path = "/api/vault/{name}",
    responses(
        (status = 200, description = "Category hidden", body = StatusResponse),
        (status = 400, description = "Invalid name, or the default category"),
        (status = 403, description = "Vault password required"),
    ),
    params(
        ("name" = String, Path, description = "Category name"),
        ("X-Vault-Password" = String, Header, description = "Vault password"),
    ),
    tag = "Vault"
)]
pub async fn hide_category(
    State(gallery): State<Arc<GalleryService>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, ApiError> {
    require_unlocked(&gallery, &headers)?;
    let category = gallery.hide_category(&name)?;
    Ok(Json(StatusResponse::ok(format!("Hid category {category}"))))
}

/// Take a category out of the vault
#[utoipa::path(
    delete,
    path = "/api/vault/{name}",
    responses(
        (status = 200, description = "Category visible again", body = StatusResponse),
        (status = 400, description = "Invalid category name"),
        (status = 403, description = "Vault password required"),
    ),
    params(
        ("name" = String, Path, description = "Category name"),
        ("X-Vault-Password" = String, Header, description = "Vault password"),
    ),
    tag = "Vault"
)]
pub async fn unhide_category(
    State(gallery): State<Arc<GalleryService>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, ApiError> {
    require_unlocked(&gallery, &headers)?;
    let category = gallery.unhide_category(&name)?;
    Ok(Json(StatusResponse::ok(format!("Unhid category {category}"))))
}

fn require_unlocked(gallery: &GalleryService, headers: &HeaderMap) -> Result<(), ApiError> {
    if request_access(gallery, headers).is_unlocked() {
        Ok(())
    } else {
        Err(crate::error::GalleryError::Auth.into())
    }
}
