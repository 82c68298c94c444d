//! Error types for color parsing and palette validation

use std::fmt;
use std::num::ParseIntError;

/// A hex color string could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseColorError {
    /// Not 3 or 6 hex digits after stripping `#`
    InvalidLength,
    /// Non-hexadecimal character
    InvalidHex(ParseIntError),
}

impl From<ParseIntError> for ParseColorError {
    fn from(err: ParseIntError) -> Self {
        ParseColorError::InvalidHex(err)
    }
}

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseColorError::InvalidLength => {
                write!(f, "invalid hex color length (expected 3 or 6 characters)")
            }
            ParseColorError::InvalidHex(err) => write!(f, "invalid hex character: {}", err),
        }
    }
}

impl std::error::Error for ParseColorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseColorError::InvalidHex(err) => Some(err),
            _ => None,
        }
    }
}

/// The perceptual and device tables do not form a valid palette.
#[derive(Debug, Clone, PartialEq)]
pub enum PaletteError {
    /// A table does not hold exactly [`PALETTE_SIZE`](super::PALETTE_SIZE) entries
    WrongSize { table: &'static str, len: usize },
    /// Perceptual and device tables differ in length
    LengthMismatch { perceptual: usize, device: usize },
    /// The same color appears twice in one table
    DuplicateColor { table: &'static str, index: usize },
    /// A hex color string was invalid
    ParseColor(ParseColorError),
}

impl From<ParseColorError> for PaletteError {
    fn from(err: ParseColorError) -> Self {
        PaletteError::ParseColor(err)
    }
}

impl fmt::Display for PaletteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaletteError::WrongSize { table, len } => write!(
                f,
                "{} table has {} colors, expected {}",
                table,
                len,
                super::PALETTE_SIZE
            ),
            PaletteError::LengthMismatch { perceptual, device } => write!(
                f,
                "palette length mismatch: perceptual has {} colors, device has {}",
                perceptual, device
            ),
            PaletteError::DuplicateColor { table, index } => {
                write!(f, "duplicate color in {} table at index {}", table, index)
            }
            PaletteError::ParseColor(err) => write!(f, "invalid color: {}", err),
        }
    }
}

impl std::error::Error for PaletteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PaletteError::ParseColor(err) => Some(err),
            _ => None,
        }
    }
}
