//! Inkframe - photo gallery for 6-color e-paper frames.
//!
//! Converts uploaded photos into panel-ready frames, keeps a categorized
//! gallery with a password-protected vault, and drives the panel through a
//! single exclusive gate. This library exposes modules for integration
//! testing.

pub mod api;
pub mod error;
pub mod models;
pub mod rendering;
pub mod server;
pub mod services;
