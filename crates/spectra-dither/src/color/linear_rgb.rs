//! Linear RGB color type
//!
//! Light intensity proportional to photon count. Quantization error is
//! accumulated and diffused here.

use super::srgb::Srgb;

/// A color in linear RGB. Channels may leave `0.0..=1.0` while error is
/// being carried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl LinearRgb {
    #[inline]
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// IEC 61966-2-1 decode of a single sRGB channel.
#[inline]
fn decode_channel(srgb: f32) -> f32 {
    if srgb <= 0.040_45 {
        srgb / 12.92
    } else {
        ((srgb + 0.055) / 1.055).powf(2.4)
    }
}

impl From<Srgb> for LinearRgb {
    fn from(srgb: Srgb) -> Self {
        Self {
            r: decode_channel(srgb.r),
            g: decode_channel(srgb.g),
            b: decode_channel(srgb.b),
        }
    }
}
