//! Dual-table palettes and their validation errors.

mod error;
mod palette;

pub use error::{PaletteError, ParseColorError};
pub use palette::{DistanceMetric, Palette, PALETTE_SIZE};
