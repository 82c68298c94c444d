//! Unified error type for the public API.

use crate::palette::{PaletteError, ParseColorError};
use std::fmt;

/// Wraps every error the crate can produce, for `?` in application code.
///
/// ```
/// use spectra_dither::{DitherError, Palette};
///
/// fn load() -> Result<Palette, DitherError> {
///     let p = ["#000", "#FFF", "#FF0", "#F00", "#00F", "#0F0"];
///     Ok(Palette::from_hex(&p, &p)?)
/// }
/// assert!(load().is_ok());
/// ```
#[derive(Debug)]
pub enum DitherError {
    Palette(PaletteError),
    ParseColor(ParseColorError),
    /// Pixel buffer length does not match `width * height`
    BufferSize { expected: usize, actual: usize },
}

impl fmt::Display for DitherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DitherError::Palette(err) => write!(f, "palette error: {}", err),
            DitherError::ParseColor(err) => write!(f, "color parse error: {}", err),
            DitherError::BufferSize { expected, actual } => write!(
                f,
                "pixel buffer holds {} pixels, expected {}",
                actual, expected
            ),
        }
    }
}

impl std::error::Error for DitherError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DitherError::Palette(err) => Some(err),
            DitherError::ParseColor(err) => Some(err),
            DitherError::BufferSize { .. } => None,
        }
    }
}

impl From<PaletteError> for DitherError {
    fn from(err: PaletteError) -> Self {
        DitherError::Palette(err)
    }
}

impl From<ParseColorError> for DitherError {
    fn from(err: ParseColorError) -> Self {
        DitherError::ParseColor(err)
    }
}
