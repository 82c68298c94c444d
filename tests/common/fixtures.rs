//! Test fixtures and constants.

use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use inkframe::models::PanelSpec;
use std::collections::HashSet;
use std::io::Cursor;

/// Panel used by every test app: small enough to dither instantly
pub const TEST_PANEL: PanelSpec = PanelSpec {
    width: 24,
    height: 32,
};

pub const VAULT_PASSWORD: &str = "correct horse";

/// Raw device colors of the six inks
pub const DEVICE_COLORS: [[u8; 3]; 6] = [
    [0, 0, 0],
    [255, 255, 255],
    [255, 255, 0],
    [255, 0, 0],
    [0, 0, 255],
    [0, 255, 0],
];

pub fn device_colors() -> HashSet<[u8; 3]> {
    DEVICE_COLORS.into_iter().collect()
}

/// Horizontal/vertical color ramp
pub fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            (255 - x * 255 / width.max(1)) as u8,
        ])
    })
}

fn encode(image: &image::DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), format)
        .expect("encode fixture");
    buf
}

/// PNG bytes of a gradient photo
pub fn png_photo(width: u32, height: u32) -> Vec<u8> {
    encode(
        &image::DynamicImage::ImageRgb8(gradient(width, height)),
        ImageFormat::Png,
    )
}

/// JPEG bytes of a gradient photo
pub fn jpeg_photo(width: u32, height: u32) -> Vec<u8> {
    encode(
        &image::DynamicImage::ImageRgb8(gradient(width, height)),
        ImageFormat::Jpeg,
    )
}

/// Fully transparent PNG
pub fn transparent_png(width: u32, height: u32) -> Vec<u8> {
    encode(
        &image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]))),
        ImageFormat::Png,
    )
}

/// Bytes that no decoder accepts
pub fn garbage() -> Vec<u8> {
    b"this is not an image, just some text".to_vec()
}
