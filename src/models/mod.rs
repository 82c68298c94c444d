pub mod access;
pub mod category;
pub mod config;
pub mod panel_spec;

pub use access::{AccessContext, VaultSecret, VAULT_PASSWORD_HEADER};
pub use category::{Category, DEFAULT_CATEGORY};
pub use config::{
    AppConfig, DitherConfig, PaletteConfig, PanelConfig, ThumbnailConfig, VaultConfig,
};
pub use panel_spec::PanelSpec;
