//! [`DitheredImage`]: palette indices plus the palette that gives them color.
//!
//! The indexed form is canonical. RGB renditions are produced on demand by
//! looking each index up in one of the two palette tables, so the perceptual
//! preview and the device frame always come from the same single dither.

use crate::palette::Palette;

/// Which palette table to render indices through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteTarget {
    /// What the panel will look like.
    Perceptual,
    /// The raw colors the driver expects.
    Device,
}

/// One palette index per pixel, row-major.
///
/// ```
/// use spectra_dither::{DitheredImage, Palette, PaletteTarget};
///
/// let image = DitheredImage::new(vec![0, 1, 1, 0], 2, 2, Palette::spectra6());
/// let device = image.to_rgb(PaletteTarget::Device);
/// assert_eq!(&device[..6], &[0, 0, 0, 255, 255, 255]);
/// ```
#[derive(Debug, Clone)]
pub struct DitheredImage {
    indices: Vec<u8>,
    width: usize,
    height: usize,
    palette: Palette,
}

impl DitheredImage {
    /// # Panics (debug only)
    ///
    /// Debug-asserts that `indices.len() == width * height`.
    pub fn new(indices: Vec<u8>, width: usize, height: usize, palette: Palette) -> Self {
        debug_assert_eq!(
            indices.len(),
            width * height,
            "indices length ({}) must match {}x{}",
            indices.len(),
            width,
            height,
        );
        Self {
            indices,
            width,
            height,
            palette,
        }
    }

    #[inline]
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// `[R, G, B, R, G, B, ...]`, `width * height * 3` bytes.
    ///
    /// Substitution is index-for-index; nothing is re-matched or re-dithered.
    pub fn to_rgb(&self, target: PaletteTarget) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.indices.len() * 3);
        for &idx in &self.indices {
            let color = match target {
                PaletteTarget::Perceptual => self.palette.perceptual(idx as usize),
                PaletteTarget::Device => self.palette.device(idx as usize),
            };
            rgb.extend_from_slice(&color.to_bytes());
        }
        rgb
    }
}
