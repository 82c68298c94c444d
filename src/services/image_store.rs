use crate::error::GalleryError;
use crate::rendering::{encode_bmp, PreparedImage};
use crate::services::atomic_write::write_atomic;
use chrono::{DateTime, Utc};
use image::{ImageFormat, RgbImage};
use std::io;
use std::path::{Path, PathBuf};

const IMAGE_EXT: &str = "bmp";
const MAX_NAME_LEN: usize = 128;

/// A device-ready image on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub name: String,
    pub modified: Option<DateTime<Utc>>,
}

/// Device-ready frames and thumbnails, one `<name>.bmp` of each.
#[derive(Debug, Clone)]
pub struct ImageStore {
    images_dir: PathBuf,
    thumbs_dir: PathBuf,
}

impl ImageStore {
    pub fn new(images_dir: impl Into<PathBuf>, thumbs_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
            thumbs_dir: thumbs_dir.into(),
        }
    }

    pub fn ensure_dirs(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.images_dir)?;
        std::fs::create_dir_all(&self.thumbs_dir)
    }

    pub fn image_path(&self, name: &str) -> PathBuf {
        self.images_dir.join(format!("{name}.{IMAGE_EXT}"))
    }

    pub fn thumb_path(&self, name: &str) -> PathBuf {
        self.thumbs_dir.join(format!("{name}.{IMAGE_EXT}"))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.image_path(name).is_file()
    }

    /// Write the device frame and thumbnail, replacing any previous version.
    ///
    /// Both files are encoded before either is written.
    pub fn save(&self, name: &str, prepared: &PreparedImage) -> Result<(), GalleryError> {
        let frame = encode_bmp(&prepared.device)?;
        let thumb = encode_bmp(&prepared.thumbnail)?;
        write_atomic(&self.image_path(name), &frame)?;
        write_atomic(&self.thumb_path(name), &thumb)?;
        Ok(())
    }

    pub fn load_frame(&self, name: &str) -> Result<RgbImage, GalleryError> {
        let bytes = read_existing(&self.image_path(name), name)?;
        let frame = image::load_from_memory_with_format(&bytes, ImageFormat::Bmp)
            .map_err(|e| GalleryError::Process(format!("Stored frame {name} is unreadable: {e}")))?;
        Ok(frame.to_rgb8())
    }

    pub fn read_thumbnail(&self, name: &str) -> Result<Vec<u8>, GalleryError> {
        read_existing(&self.thumb_path(name), name)
    }

    /// Remove both files. Missing files are not an error.
    pub fn delete(&self, name: &str) -> Result<bool, GalleryError> {
        let removed_image = remove_if_exists(&self.image_path(name))?;
        let removed_thumb = remove_if_exists(&self.thumb_path(name))?;
        Ok(removed_image || removed_thumb)
    }

    /// All stored frames, sorted by name.
    pub fn list(&self) -> Result<Vec<StoredImage>, GalleryError> {
        let entries = match std::fs::read_dir(&self.images_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut images = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(IMAGE_EXT) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if validate_name(name).is_err() {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .map(DateTime::<Utc>::from);
            images.push(StoredImage {
                name: name.to_string(),
                modified,
            });
        }
        images.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(images)
    }
}

/// Derive a storage name from an uploaded filename.
///
/// Directory components and the extension are dropped, characters outside
/// `[A-Za-z0-9._-]` become `_`, and leading dots are stripped.
pub fn sanitize_name(filename: &str) -> Result<String, GalleryError> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let stem = match base.rfind('.') {
        Some(dot) if dot > 0 => &base[..dot],
        _ => base,
    };

    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned: String = cleaned
        .trim_start_matches('.')
        .chars()
        .take(MAX_NAME_LEN)
        .collect();

    if cleaned.is_empty() {
        return Err(GalleryError::InvalidName(filename.to_string()));
    }
    Ok(cleaned)
}

/// Check that `name` is already a storage name, as produced by
/// [`sanitize_name`].
pub fn validate_name(name: &str) -> Result<(), GalleryError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(GalleryError::InvalidName(name.to_string()))
    }
}

fn read_existing(path: &Path, name: &str) -> Result<Vec<u8>, GalleryError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(GalleryError::NotFound(name.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
