//! Palette with index-aligned perceptual and device tables.

use std::collections::HashSet;

use super::error::PaletteError;
use crate::color::{LinearRgb, Oklab, Srgb};

/// Number of inks on the panel. Both tables hold exactly this many entries.
pub const PALETTE_SIZE: usize = 6;

/// Distance metric for palette matching.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DistanceMetric {
    /// Squared Euclidean distance in Oklab.
    #[default]
    Euclidean,

    /// HyAB (Abasi et al., 2020) plus a chroma-magnitude penalty:
    /// `kl * |dL| + kc * sqrt(da² + db²) + kchroma * |C_pixel - C_entry|`.
    ///
    /// Keeps grey pixels on black/white instead of drifting onto a chromatic
    /// ink of similar lightness (yellow sits at L≈0.9, right next to white).
    HyAB { kl: f32, kc: f32, kchroma: f32 },
}

/// Entries with Oklab chroma above this count as chromatic.
const CHROMA_DETECTION_THRESHOLD: f32 = 0.03;

/// The panel palette.
///
/// `perceptual[i]` is what ink `i` looks like on the panel and is what
/// pixels are matched against; `device[i]` is the color the driver expects
/// for the same ink. The index is the only link between the two tables.
///
/// # Example
///
/// ```
/// use spectra_dither::{Palette, Srgb};
///
/// let palette = Palette::spectra6();
/// assert_eq!(palette.len(), 6);
/// assert_eq!(palette.device(3).to_bytes(), [255, 0, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct Palette {
    perceptual_srgb: [Srgb; PALETTE_SIZE],
    perceptual_linear: [LinearRgb; PALETTE_SIZE],
    perceptual_oklab: [Oklab; PALETTE_SIZE],
    perceptual_chroma: [f32; PALETTE_SIZE],
    device_srgb: [Srgb; PALETTE_SIZE],
    distance_metric: DistanceMetric,
}

impl Palette {
    /// Build a palette from the two tables.
    ///
    /// # Errors
    ///
    /// - [`PaletteError::LengthMismatch`] if the tables differ in length
    /// - [`PaletteError::WrongSize`] if they do not hold [`PALETTE_SIZE`] entries
    /// - [`PaletteError::DuplicateColor`] if either table repeats a color
    pub fn new(perceptual: &[Srgb], device: &[Srgb]) -> Result<Self, PaletteError> {
        if perceptual.len() != device.len() {
            return Err(PaletteError::LengthMismatch {
                perceptual: perceptual.len(),
                device: device.len(),
            });
        }
        if perceptual.len() != PALETTE_SIZE {
            return Err(PaletteError::WrongSize {
                table: "perceptual",
                len: perceptual.len(),
            });
        }

        check_unique("perceptual", perceptual)?;
        check_unique("device", device)?;

        let mut perceptual_srgb = [Srgb::new(0.0, 0.0, 0.0); PALETTE_SIZE];
        let mut device_srgb = [Srgb::new(0.0, 0.0, 0.0); PALETTE_SIZE];
        perceptual_srgb.copy_from_slice(perceptual);
        device_srgb.copy_from_slice(device);

        let perceptual_linear = perceptual_srgb.map(LinearRgb::from);
        let perceptual_oklab = perceptual_linear.map(Oklab::from);
        let perceptual_chroma = perceptual_oklab.map(Oklab::chroma);

        let distance_metric = if perceptual_chroma
            .iter()
            .any(|&c| c > CHROMA_DETECTION_THRESHOLD)
        {
            DistanceMetric::HyAB {
                kl: 2.0,
                kc: 1.0,
                kchroma: 10.0,
            }
        } else {
            DistanceMetric::Euclidean
        };

        Ok(Self {
            perceptual_srgb,
            perceptual_linear,
            perceptual_oklab,
            perceptual_chroma,
            device_srgb,
            distance_metric,
        })
    }

    /// Build a palette from hex strings, e.g. `"#191E21"`.
    pub fn from_hex<S: AsRef<str>>(perceptual: &[S], device: &[S]) -> Result<Self, PaletteError> {
        let parse = |colors: &[S]| -> Result<Vec<Srgb>, PaletteError> {
            colors
                .iter()
                .map(|c| c.as_ref().parse::<Srgb>().map_err(PaletteError::from))
                .collect()
        };
        Self::new(&parse(perceptual)?, &parse(device)?)
    }

    /// The E Ink Spectra 6 palette: black, white, yellow, red, blue, green.
    ///
    /// Perceptual values are measured panel appearance; device values are
    /// the pure colors the Waveshare drivers map to ink codes.
    pub fn spectra6() -> Self {
        const PERCEPTUAL: [[u8; 3]; PALETTE_SIZE] = [
            [25, 30, 33],
            [232, 232, 232],
            [239, 222, 68],
            [178, 19, 24],
            [33, 87, 186],
            [18, 95, 32],
        ];
        const DEVICE: [[u8; 3]; PALETTE_SIZE] = [
            [0, 0, 0],
            [255, 255, 255],
            [255, 255, 0],
            [255, 0, 0],
            [0, 0, 255],
            [0, 255, 0],
        ];
        Self::new(&PERCEPTUAL.map(Srgb::from_bytes), &DEVICE.map(Srgb::from_bytes))
            .expect("built-in Spectra 6 palette is valid")
    }

    #[inline]
    pub fn len(&self) -> usize {
        PALETTE_SIZE
    }

    /// Always `false`; kept for clippy's `len_without_is_empty`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Perceptual color of ink `idx`. Indices past the table collapse to
    /// entry 0 so no color outside the table can ever be produced.
    #[inline]
    pub fn perceptual(&self, idx: usize) -> Srgb {
        *self
            .perceptual_srgb
            .get(idx)
            .unwrap_or(&self.perceptual_srgb[0])
    }

    /// Device color of ink `idx`, with the same collapse-to-0 rule.
    #[inline]
    pub fn device(&self, idx: usize) -> Srgb {
        *self.device_srgb.get(idx).unwrap_or(&self.device_srgb[0])
    }

    #[inline]
    pub fn perceptual_linear(&self, idx: usize) -> LinearRgb {
        self.perceptual_linear[idx]
    }

    pub fn perceptual_table(&self) -> &[Srgb; PALETTE_SIZE] {
        &self.perceptual_srgb
    }

    pub fn device_table(&self) -> &[Srgb; PALETTE_SIZE] {
        &self.device_srgb
    }

    /// Override the auto-detected metric.
    pub fn with_distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.distance_metric = metric;
        self
    }

    pub fn distance_metric(&self) -> DistanceMetric {
        self.distance_metric
    }

    #[inline]
    fn distance(&self, pixel: Oklab, pixel_chroma: f32, idx: usize) -> f32 {
        let entry = self.perceptual_oklab[idx];
        match self.distance_metric {
            DistanceMetric::Euclidean => pixel.distance_squared(entry),
            DistanceMetric::HyAB { kl, kc, kchroma } => {
                let dl = (pixel.l - entry.l).abs();
                let da = pixel.a - entry.a;
                let db = pixel.b - entry.b;
                let chroma_penalty = (pixel_chroma - self.perceptual_chroma[idx]).abs();
                kl * dl + kc * (da * da + db * db).sqrt() + kchroma * chroma_penalty
            }
        }
    }

    /// Nearest perceptual entry to `color`. Ties go to the lower index.
    #[inline]
    pub fn find_nearest(&self, color: Oklab) -> (usize, f32) {
        let pixel_chroma = color.chroma();
        let mut best_idx = 0;
        let mut best_dist = f32::MAX;

        for i in 0..PALETTE_SIZE {
            let dist = self.distance(color, pixel_chroma, i);
            if dist < best_dist {
                best_dist = dist;
                best_idx = i;
            }
        }

        (best_idx, best_dist)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::spectra6()
    }
}

fn check_unique(table: &'static str, colors: &[Srgb]) -> Result<(), PaletteError> {
    let mut seen = HashSet::new();
    for (index, color) in colors.iter().enumerate() {
        if !seen.insert(color.to_bytes()) {
            return Err(PaletteError::DuplicateColor { table, index });
        }
    }
    Ok(())
}
