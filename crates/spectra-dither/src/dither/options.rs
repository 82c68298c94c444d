//! Dithering options.

/// Configuration for error diffusion.
///
/// Defaults follow the classic raster-order behaviour: every row is
/// scanned left to right and accumulated error is clamped to half a unit
/// of linear light per channel.
///
/// ```
/// use spectra_dither::DitherOptions;
///
/// let options = DitherOptions::new().serpentine(true).error_clamp(0.3);
/// assert!(options.serpentine);
/// ```
#[derive(Debug, Clone)]
pub struct DitherOptions {
    /// Alternate scan direction on odd rows, mirroring the kernel.
    ///
    /// Default: `false`
    pub serpentine: bool,

    /// Pixel values plus carried error are clamped to
    /// `[-error_clamp, 1.0 + error_clamp]` per channel.
    ///
    /// Default: `0.5`
    pub error_clamp: f32,
}

impl Default for DitherOptions {
    fn default() -> Self {
        Self {
            serpentine: false,
            error_clamp: 0.5,
        }
    }
}

impl DitherOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn serpentine(mut self, enabled: bool) -> Self {
        self.serpentine = enabled;
        self
    }

    #[inline]
    pub fn error_clamp(mut self, clamp: f32) -> Self {
        self.error_clamp = clamp;
        self
    }
}
