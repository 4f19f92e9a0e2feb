#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color conversions needed by the tracking front-end.
pub mod color;

/// image basic operations module.
pub mod core;

/// utilities to draw on images.
pub mod draw;

/// corner response and feature selection module.
pub mod features;

/// image filtering module.
pub mod filter;

/// utilities for interpolation.
pub mod interpolation;

/// module containing parallization utilities.
pub mod parallel;

/// Gaussian pyramid construction.
pub mod pyramid;

/// image geometric transformations module.
pub mod warp;
