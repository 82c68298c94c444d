//! Color types and conversions
//!
//! - **sRGB**: gamma-encoded, what image files and palettes are written in.
//! - **LinearRgb**: light intensity, where error arithmetic is valid.
//! - **Oklab**: perceptually uniform, where nearest-color distances are taken.

mod linear_rgb;
mod oklab;
mod srgb;

pub use linear_rgb::LinearRgb;
pub use oklab::Oklab;
pub use srgb::Srgb;
