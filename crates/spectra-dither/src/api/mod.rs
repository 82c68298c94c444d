//! High-level API: the [`Ditherer`] builder and the [`DitherError`] umbrella error.

mod builder;
mod error;

pub use builder::Ditherer;
pub use error::DitherError;
