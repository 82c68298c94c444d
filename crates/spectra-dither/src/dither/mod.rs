//! Error diffusion dithering.
//!
//! Each pixel, plus the error carried to it from already-visited pixels, is
//! matched to the nearest perceptual palette entry. The difference between
//! what was wanted and what the ink delivers is then spread over the
//! unvisited neighbors according to a [`Kernel`].
//!
//! The loop is fully deterministic: no noise, no randomised thresholds.
//! Identical input pixels always produce identical indices.

mod kernel;
mod options;

pub use kernel::{Kernel, ATKINSON, FLOYD_STEINBERG};
pub use options::DitherOptions;

use std::fmt;
use std::str::FromStr;

use crate::color::{LinearRgb, Oklab};
use crate::palette::Palette;

/// Which diffusion kernel to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DitherAlgorithm {
    /// 7/16 right, 3/16 below-left, 5/16 below, 1/16 below-right.
    #[default]
    FloydSteinberg,
    /// Six neighbors at 1/8 each; 25% of the error is dropped.
    Atkinson,
}

impl DitherAlgorithm {
    pub fn kernel(self) -> &'static Kernel {
        match self {
            DitherAlgorithm::FloydSteinberg => &FLOYD_STEINBERG,
            DitherAlgorithm::Atkinson => &ATKINSON,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DitherAlgorithm::FloydSteinberg => "floyd-steinberg",
            DitherAlgorithm::Atkinson => "atkinson",
        }
    }
}

impl fmt::Display for DitherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DitherAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "floyd-steinberg" | "floydsteinberg" | "fs" => Ok(DitherAlgorithm::FloydSteinberg),
            "atkinson" => Ok(DitherAlgorithm::Atkinson),
            other => Err(format!("unknown dither algorithm: {other}")),
        }
    }
}

/// Sliding window of error rows, `max_dy + 1` deep.
#[derive(Debug)]
pub struct ErrorBuffer {
    /// rows[0] is the current row, rows[1] the next, ...
    rows: Vec<Vec<[f32; 3]>>,
    width: usize,
}

impl ErrorBuffer {
    pub fn new(width: usize, row_depth: usize) -> Self {
        Self {
            rows: (0..row_depth).map(|_| vec![[0.0; 3]; width]).collect(),
            width,
        }
    }

    #[inline]
    pub fn get_accumulated(&self, x: usize) -> [f32; 3] {
        self.rows[0][x]
    }

    /// Out-of-bounds targets are ignored.
    #[inline]
    pub fn add_error(&mut self, x: usize, row_offset: usize, error: [f32; 3]) {
        if x < self.width && row_offset < self.rows.len() {
            let cell = &mut self.rows[row_offset][x];
            for c in 0..3 {
                cell[c] += error[c];
            }
        }
    }

    pub fn advance_row(&mut self) {
        self.rows.rotate_left(1);
        if let Some(last) = self.rows.last_mut() {
            last.fill([0.0; 3]);
        }
    }
}

#[inline]
fn clamp_channel(value: f32, max_error: f32) -> f32 {
    value.clamp(-max_error, 1.0 + max_error)
}

/// Dither linear-light pixels (row-major) to palette indices.
///
/// Every returned index is in `0..palette.len()`.
pub fn dither_indices(
    image: &[LinearRgb],
    width: usize,
    height: usize,
    palette: &Palette,
    kernel: &Kernel,
    options: &DitherOptions,
) -> Vec<u8> {
    debug_assert_eq!(image.len(), width * height);

    let mut output = vec![0u8; width * height];
    let mut error_buf = ErrorBuffer::new(width, kernel.max_dy + 1);
    let divisor = kernel.divisor as f32;

    for y in 0..height {
        let reverse = options.serpentine && y % 2 == 1;

        for step in 0..width {
            let x = if reverse { width - 1 - step } else { step };
            let idx = y * width + x;

            let accumulated = error_buf.get_accumulated(x);
            let pixel = LinearRgb::new(
                clamp_channel(image[idx].r + accumulated[0], options.error_clamp),
                clamp_channel(image[idx].g + accumulated[1], options.error_clamp),
                clamp_channel(image[idx].b + accumulated[2], options.error_clamp),
            );

            let (nearest_idx, _) = palette.find_nearest(Oklab::from(pixel));
            output[idx] = nearest_idx as u8;

            let ink = palette.perceptual_linear(nearest_idx);
            let error = [pixel.r - ink.r, pixel.g - ink.g, pixel.b - ink.b];

            for &(dx, dy, weight) in kernel.entries {
                let effective_dx = if reverse { -dx } else { dx };
                let nx = x as i64 + effective_dx as i64;
                let ny = y + dy as usize;
                if nx < 0 || nx as usize >= width || ny >= height {
                    continue;
                }
                let share = weight as f32 / divisor;
                error_buf.add_error(
                    nx as usize,
                    dy as usize,
                    [error[0] * share, error[1] * share, error[2] * share],
                );
            }
        }

        error_buf.advance_row();
    }

    output
}
