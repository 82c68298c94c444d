use crate::error::GalleryError;
use crate::models::{AccessContext, AppConfig, Category, PanelSpec, VaultSecret};
use crate::rendering::ImageProcessor;
use crate::services::device_gate::DeviceGate;
use crate::services::display_driver::DisplayDriver;
use crate::services::image_store::{sanitize_name, validate_name, ImageStore};
use crate::services::metadata_store::MetadataStore;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;

/// One image as seen by a gallery listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSummary {
    pub name: String,
    pub category: Category,
    pub modified: Option<DateTime<Utc>>,
}

/// Result of a listing, with the filter actually applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageListing {
    pub category: Option<Category>,
    pub images: Vec<ImageSummary>,
}

/// Gallery operations: uploads, listings, categories, the vault and the
/// display.
pub struct GalleryService {
    processor: Arc<ImageProcessor>,
    images: ImageStore,
    metadata: MetadataStore,
    gate: Arc<DeviceGate>,
    vault: VaultSecret,
}

impl GalleryService {
    pub fn new(
        processor: ImageProcessor,
        images: ImageStore,
        metadata: MetadataStore,
        gate: Arc<DeviceGate>,
        vault: VaultSecret,
    ) -> Self {
        Self {
            processor: Arc::new(processor),
            images,
            metadata,
            gate,
            vault,
        }
    }

    /// Wire everything from config around `driver`, creating the data
    /// directories.
    pub fn from_config(config: &AppConfig, driver: Box<dyn DisplayDriver>) -> Result<Self, GalleryError> {
        let gate = Arc::new(DeviceGate::new(driver));
        let processor = ImageProcessor::from_config(config, gate.panel())
            .map_err(|e| GalleryError::Config(e.to_string()))?;

        let images = ImageStore::new(config.images_dir(), config.thumbs_dir());
        images.ensure_dirs()?;

        let metadata = MetadataStore::new(
            config.categories_file(),
            config.vault_file(),
            config.category_names_file(),
        );
        let vault = VaultSecret::new(config.vault.password.clone());
        if !vault.is_configured() {
            tracing::warn!("No vault password configured, hidden categories cannot be unlocked");
        }

        Ok(Self::new(processor, images, metadata, gate, vault))
    }

    pub fn panel(&self) -> PanelSpec {
        self.gate.panel()
    }

    pub fn is_display_busy(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn gate(&self) -> &Arc<DeviceGate> {
        &self.gate
    }

    /// Convert and store an uploaded photo, optionally showing it right away.
    ///
    /// Nothing is written if the bytes do not decode. When `show` is set the
    /// image is stored before the display is attempted, so a busy display
    /// still leaves the upload in place.
    pub async fn upload(&self, filename: &str, bytes: Vec<u8>, show: bool) -> Result<ImageSummary, GalleryError> {
        let name = sanitize_name(filename)?;

        let processor = self.processor.clone();
        let images = self.images.clone();
        let stored_name = name.clone();
        let device = tokio::task::spawn_blocking(move || -> Result<_, GalleryError> {
            let prepared = processor.prepare(&bytes)?;
            images.save(&stored_name, &prepared)?;
            Ok(prepared.device)
        })
        .await??;

        tracing::info!(name = %name, original = filename, "Image uploaded");

        if show {
            let permit = self.gate.try_acquire()?;
            let gate = self.gate.clone();
            tokio::task::spawn_blocking(move || gate.render(permit, &device)).await??;
            tracing::info!(name = %name, "Image displayed");
        }

        Ok(ImageSummary {
            category: self.metadata.get_category(&name)?,
            modified: Some(Utc::now()),
            name,
        })
    }

    /// Stored images visible to `access`, optionally limited to one category.
    ///
    /// A locked caller asking for a hidden category gets the default
    /// category instead.
    pub fn list_images(
        &self,
        filter: Option<&Category>,
        access: AccessContext,
    ) -> Result<ImageListing, GalleryError> {
        let assignments = self.metadata.category_map()?;
        let hidden = if access.is_unlocked() {
            BTreeSet::new()
        } else {
            self.metadata.hidden_categories()?
        };

        let filter = filter.map(|requested| {
            if hidden.contains(requested) {
                Category::Default
            } else {
                requested.clone()
            }
        });

        let images = self
            .images
            .list()?
            .into_iter()
            .filter_map(|stored| {
                let category = assignments.get(&stored.name).cloned().unwrap_or_default();
                if hidden.contains(&category) {
                    return None;
                }
                if filter.as_ref().is_some_and(|f| *f != category) {
                    return None;
                }
                Some(ImageSummary {
                    name: stored.name,
                    category,
                    modified: stored.modified,
                })
            })
            .collect();

        Ok(ImageListing {
            category: filter,
            images,
        })
    }

    /// Show a stored image on the panel.
    pub async fn render(&self, name: &str, access: AccessContext) -> Result<(), GalleryError> {
        validate_name(name)?;
        if !self.images.exists(name) {
            return Err(GalleryError::NotFound(name.to_string()));
        }
        self.check_image_visible(name, access)?;

        let permit = self.gate.try_acquire()?;
        let gate = self.gate.clone();
        let images = self.images.clone();
        let owned = name.to_string();
        tokio::task::spawn_blocking(move || {
            let frame = images.load_frame(&owned)?;
            gate.render(permit, &frame)
        })
        .await??;

        tracing::info!(name, "Image displayed");
        Ok(())
    }

    /// Blank the panel to white.
    pub async fn clear_display(&self) -> Result<(), GalleryError> {
        let permit = self.gate.try_acquire()?;
        let gate = self.gate.clone();
        tokio::task::spawn_blocking(move || gate.clear(permit)).await??;
        tracing::info!("Display cleared");
        Ok(())
    }

    /// Remove an image and its category assignment. Deleting a missing
    /// image succeeds.
    pub fn delete(&self, name: &str, access: AccessContext) -> Result<(), GalleryError> {
        validate_name(name)?;
        self.check_image_visible(name, access)?;
        let removed = self.images.delete(name)?;
        self.metadata.remove_image(name)?;
        tracing::info!(name, removed, "Image deleted");
        Ok(())
    }

    pub fn thumbnail(&self, name: &str, access: AccessContext) -> Result<Vec<u8>, GalleryError> {
        validate_name(name)?;
        self.check_image_visible(name, access)?;
        self.images.read_thumbnail(name)
    }

    pub fn get_category(&self, name: &str) -> Result<Category, GalleryError> {
        validate_name(name)?;
        Ok(self.metadata.get_category(name)?)
    }

    /// Assign `name` to `category`. Locked callers can neither move an
    /// image out of a hidden category nor into one.
    pub fn set_category(
        &self,
        name: &str,
        category: &str,
        access: AccessContext,
    ) -> Result<Category, GalleryError> {
        validate_name(name)?;
        let category = Category::parse(category)?;
        self.check_image_visible(name, access)?;
        self.check_category_visible(&category, access)?;
        self.metadata.set_category(name, &category)?;
        Ok(category)
    }

    pub fn create_category(&self, category: &str) -> Result<Category, GalleryError> {
        let category = Category::parse(category)?;
        self.metadata.create_category(&category)?;
        Ok(category)
    }

    /// Delete a category, moving its images back to default. A hidden
    /// category is `NotFound` for locked callers.
    pub fn delete_category(&self, category: &str, access: AccessContext) -> Result<(), GalleryError> {
        let category = Category::parse(category)?;
        self.check_category_visible(&category, access)?;
        Ok(self.metadata.delete_category(&category)?)
    }

    pub fn hide_category(&self, category: &str) -> Result<Category, GalleryError> {
        let category = Category::parse(category)?;
        self.metadata.hide_category(&category)?;
        Ok(category)
    }

    pub fn unhide_category(&self, category: &str) -> Result<Category, GalleryError> {
        let category = Category::parse(category)?;
        self.metadata.unhide_category(&category)?;
        Ok(category)
    }

    pub fn list_categories(&self, access: AccessContext) -> Result<Vec<Category>, GalleryError> {
        Ok(self.metadata.list_categories(access.is_unlocked())?)
    }

    /// Hidden categories, for unlocked callers only.
    pub fn hidden_categories(&self, access: AccessContext) -> Result<Vec<Category>, GalleryError> {
        if !access.is_unlocked() {
            return Err(GalleryError::Auth);
        }
        Ok(self.metadata.hidden_categories()?.into_iter().collect())
    }

    /// Check a vault password.
    pub fn unlock(&self, password: &str) -> Result<AccessContext, GalleryError> {
        if self.vault.verify(password) {
            tracing::info!("Vault unlocked");
            Ok(AccessContext::unlocked())
        } else {
            tracing::debug!("Vault unlock rejected");
            Err(GalleryError::Auth)
        }
    }

    /// Images in hidden categories do not exist for locked callers.
    fn check_image_visible(&self, name: &str, access: AccessContext) -> Result<(), GalleryError> {
        if access.is_unlocked() {
            return Ok(());
        }
        let category = self.metadata.get_category(name)?;
        if self.metadata.is_hidden(&category)? {
            tracing::debug!(name, "Locked access to vaulted image");
            return Err(GalleryError::NotFound(name.to_string()));
        }
        Ok(())
    }

    fn check_category_visible(
        &self,
        category: &Category,
        access: AccessContext,
    ) -> Result<(), GalleryError> {
        if !access.is_unlocked() && self.metadata.is_hidden(category)? {
            tracing::debug!(category = %category, "Locked access to hidden category");
            return Err(GalleryError::NotFound(category.to_string()));
        }
        Ok(())
    }

    /// Access for a request that may carry a password. Anything but the
    /// correct password yields a locked context.
    pub fn access(&self, password: Option<&str>) -> AccessContext {
        password
            .and_then(|p| self.unlock(p).ok())
            .unwrap_or_default()
    }
}
