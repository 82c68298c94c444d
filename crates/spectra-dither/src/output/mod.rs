//! Dithering output.

mod dithered_image;

pub use dithered_image::{DitheredImage, PaletteTarget};
