use crate::models::PanelSpec;
use serde::{Deserialize, Deserializer};
use spectra_dither::{DitherAlgorithm, Palette, PaletteError};
use std::path::{Path, PathBuf};

/// Environment variable naming the YAML config file
pub const CONFIG_FILE_ENV: &str = "CONFIG_FILE";

/// Environment variable overriding `vault.password`
pub const VAULT_PASSWORD_ENV: &str = "INKFRAME_VAULT_PASSWORD";

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Root for images, thumbnails and metadata documents
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Largest accepted upload body in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default)]
    pub panel: PanelConfig,

    #[serde(default)]
    pub thumbnail: ThumbnailConfig,

    #[serde(default)]
    pub dither: DitherConfig,

    #[serde(default)]
    pub palette: PaletteConfig,

    #[serde(default)]
    pub vault: VaultConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_max_upload_bytes() -> usize {
    32 * 1024 * 1024
}

/// Target panel geometry and where the simulated panel writes frames
#[derive(Debug, Deserialize, Clone)]
pub struct PanelConfig {
    #[serde(default = "default_panel_width")]
    pub width: u32,

    #[serde(default = "default_panel_height")]
    pub height: u32,

    /// Defaults to `<data_dir>/panel`
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_panel_width() -> u32 {
    PanelSpec::SPECTRA6_13IN3.width
}

fn default_panel_height() -> u32 {
    PanelSpec::SPECTRA6_13IN3.height
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            width: default_panel_width(),
            height: default_panel_height(),
            output_dir: None,
        }
    }
}

/// Bounding box for gallery thumbnails
#[derive(Debug, Deserialize, Clone)]
pub struct ThumbnailConfig {
    #[serde(default = "default_thumbnail_edge")]
    pub max_width: u32,

    #[serde(default = "default_thumbnail_edge")]
    pub max_height: u32,
}

fn default_thumbnail_edge() -> u32 {
    150
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_width: default_thumbnail_edge(),
            max_height: default_thumbnail_edge(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DitherConfig {
    /// `floyd-steinberg` or `atkinson`
    #[serde(default, deserialize_with = "deserialize_algorithm")]
    pub algorithm: DitherAlgorithm,

    /// Alternate scan direction per row
    #[serde(default)]
    pub serpentine: bool,
}

fn deserialize_algorithm<'de, D>(deserializer: D) -> Result<DitherAlgorithm, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

/// Optional palette override: six hex colors per table, index-aligned
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PaletteConfig {
    #[serde(default)]
    pub perceptual: Option<Vec<String>>,

    #[serde(default)]
    pub device: Option<Vec<String>>,
}

#[derive(Deserialize, Clone, Default)]
pub struct VaultConfig {
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from `path`, falling back to defaults when the
    /// file is missing or unparsable.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("No config file given, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        data_dir = %config.data_dir.display(),
                        width = config.panel.width,
                        height = config.panel.height,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Load from `CONFIG_FILE` and apply `INKFRAME_VAULT_PASSWORD`.
    pub fn from_env() -> Self {
        let path = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);
        Self::load(path.as_deref()).with_vault_password(std::env::var(VAULT_PASSWORD_ENV).ok())
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not to an empty mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Override the vault password when `password` is set.
    pub fn with_vault_password(mut self, password: Option<String>) -> Self {
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            self.vault.password = Some(password);
        }
        self
    }

    pub fn panel_spec(&self) -> PanelSpec {
        PanelSpec::new(self.panel.width, self.panel.height)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.data_dir.join("images")
    }

    pub fn thumbs_dir(&self) -> PathBuf {
        self.data_dir.join("thumbnails")
    }

    pub fn categories_file(&self) -> PathBuf {
        self.data_dir.join("categories.json")
    }

    pub fn vault_file(&self) -> PathBuf {
        self.data_dir.join("vault.json")
    }

    pub fn category_names_file(&self) -> PathBuf {
        self.data_dir.join("category_names.json")
    }

    pub fn panel_output_dir(&self) -> PathBuf {
        self.panel
            .output_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("panel"))
    }

    /// Build the palette, applying any table overrides on top of Spectra 6.
    pub fn build_palette(&self) -> Result<Palette, PaletteError> {
        if self.palette.perceptual.is_none() && self.palette.device.is_none() {
            return Ok(Palette::spectra6());
        }

        let builtin = Palette::spectra6();
        let perceptual = match &self.palette.perceptual {
            Some(table) => table.clone(),
            None => builtin.perceptual_table().iter().map(|c| c.to_hex()).collect(),
        };
        let device = match &self.palette.device {
            Some(table) => table.clone(),
            None => builtin.device_table().iter().map(|c| c.to_hex()).collect(),
        };
        Palette::from_hex(&perceptual, &device)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            panel: PanelConfig::default(),
            thumbnail: ThumbnailConfig::default(),
            dither: DitherConfig::default(),
            palette: PaletteConfig::default(),
            vault: VaultConfig::default(),
        }
    }
}
