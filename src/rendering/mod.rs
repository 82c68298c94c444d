//! Photo to e-paper frame conversion.

pub mod processor;

pub use processor::{encode_bmp, encode_png, ImageProcessor, PreparedImage};
