//! [`Ditherer`] builder, the main entry point of the crate.

use crate::api::DitherError;
use crate::color::{LinearRgb, Srgb};
use crate::dither::{dither_indices, DitherAlgorithm, DitherOptions};
use crate::output::DitheredImage;
use crate::palette::Palette;

/// Reusable dithering configuration.
///
/// Configuration methods consume and return `self`; [`dither()`](Self::dither)
/// takes `&self`, so one `Ditherer` can process any number of images.
///
/// ```
/// use spectra_dither::{DitherAlgorithm, Ditherer, Palette, Srgb};
///
/// let ditherer = Ditherer::new(Palette::spectra6())
///     .algorithm(DitherAlgorithm::Atkinson)
///     .serpentine(true);
///
/// let pixels = vec![Srgb::from_u8(200, 40, 40); 9];
/// let result = ditherer.dither(&pixels, 3, 3);
/// assert_eq!(result.indices().len(), 9);
/// ```
#[derive(Debug, Clone)]
pub struct Ditherer {
    palette: Palette,
    options: DitherOptions,
    algorithm: DitherAlgorithm,
}

impl Ditherer {
    /// Floyd-Steinberg, raster order, default error clamp.
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            options: DitherOptions::new(),
            algorithm: DitherAlgorithm::default(),
        }
    }

    #[inline]
    pub fn algorithm(mut self, algorithm: DitherAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    #[inline]
    pub fn serpentine(mut self, enabled: bool) -> Self {
        self.options = self.options.serpentine(enabled);
        self
    }

    #[inline]
    pub fn error_clamp(mut self, clamp: f32) -> Self {
        self.options = self.options.error_clamp(clamp);
        self
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn current_algorithm(&self) -> DitherAlgorithm {
        self.algorithm
    }

    /// Dither sRGB pixels (row-major).
    ///
    /// # Panics (debug only)
    ///
    /// Debug-asserts that `pixels.len() == width * height`; use
    /// [`try_dither()`](Self::try_dither) for untrusted sizes.
    pub fn dither(&self, pixels: &[Srgb], width: usize, height: usize) -> DitheredImage {
        let linear: Vec<LinearRgb> = pixels.iter().map(|&p| LinearRgb::from(p)).collect();
        let indices = dither_indices(
            &linear,
            width,
            height,
            &self.palette,
            self.algorithm.kernel(),
            &self.options,
        );
        DitheredImage::new(indices, width, height, self.palette.clone())
    }

    /// Like [`dither()`](Self::dither), but checks the buffer size first.
    pub fn try_dither(
        &self,
        pixels: &[Srgb],
        width: usize,
        height: usize,
    ) -> Result<DitheredImage, DitherError> {
        let expected = width * height;
        if pixels.len() != expected {
            return Err(DitherError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(self.dither(pixels, width, height))
    }
}
