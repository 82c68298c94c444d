#![allow(clippy::excessive_precision, clippy::module_inception)]

//! spectra-dither: error-diffusion dithering for 6-color e-paper panels
//!
//! Panels such as the E Ink Spectra 6 accept a handful of raw color codes,
//! but the inks they lay down look quite different from those codes. This
//! crate keeps both views of the palette side by side:
//!
//! - the **perceptual** table: what each ink actually looks like, used for
//!   matching and for previews;
//! - the **device** table: the color the driver expects for that ink.
//!
//! Dithering happens exactly once, against the perceptual table. The device
//! rendition is produced afterwards by index-for-index substitution.
//!
//! # Quick Start
//!
//! ```
//! use spectra_dither::{Ditherer, Palette, PaletteTarget, Srgb};
//!
//! let ditherer = Ditherer::new(Palette::spectra6());
//! let pixels = vec![Srgb::from_u8(128, 128, 128); 4];
//! let result = ditherer.dither(&pixels, 2, 2);
//!
//! assert_eq!(result.width(), 2);
//! assert_eq!(result.to_rgb(PaletteTarget::Device).len(), 2 * 2 * 3);
//! ```
//!
//! # Color Spaces
//!
//! | Color Space | Used For |
//! |-------------|----------|
//! | [`Srgb`] | Input/output bytes, palette definitions |
//! | [`LinearRgb`] | Error accumulation and diffusion |
//! | [`Oklab`] | Nearest-palette-entry matching |
//!
//! Quantization error is a difference in light intensity, so it is carried
//! in linear RGB. Matching uses Oklab so the chosen ink is the one that
//! looks closest, not the one that is numerically closest in sRGB.

pub mod api;
pub mod color;
pub mod dither;
pub mod output;
pub mod palette;

pub use api::{DitherError, Ditherer};
pub use color::{LinearRgb, Oklab, Srgb};
pub use dither::{DitherAlgorithm, DitherOptions};
pub use output::{DitheredImage, PaletteTarget};
pub use palette::{Palette, PaletteError, ParseColorError, PALETTE_SIZE};
