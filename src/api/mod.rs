pub mod categories;
pub mod display;
pub mod images;
pub mod vault;

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{AccessContext, VAULT_PASSWORD_HEADER};
use crate::services::GalleryService;

pub use categories::{
    create_category, delete_category, list_categories, CategoryListResponse, CategoryResponse,
    CreateCategoryRequest,
};
pub use categories::{__path_create_category, __path_delete_category, __path_list_categories};
pub use display::{clear_display, display_status, DisplayStatusResponse};
pub use display::{__path_clear_display, __path_display_status};
pub use images::{
    delete_image, get_thumbnail, list_images, set_image_category, show_image, upload_image,
    ImageListResponse, ImageResponse, SetCategoryRequest,
};
pub use images::{
    __path_delete_image, __path_get_thumbnail, __path_list_images, __path_set_image_category,
    __path_show_image, __path_upload_image,
};
pub use vault::{hide_category, unhide_category, unlock, UnlockRequest, UnlockResponse};
pub use vault::{__path_hide_category, __path_unhide_category, __path_unlock};

/// Generic success body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: u16,
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: 200,
            message: message.into(),
        }
    }
}

/// Vault access for this request, from the `X-Vault-Password` header.
pub fn request_access(gallery: &GalleryService, headers: &HeaderMap) -> AccessContext {
    let password = headers
        .get(VAULT_PASSWORD_HEADER)
        .and_then(|v| v.to_str().ok());
    gallery.access(password)
}
