//! Pixel interpolation methods for image transformations.
//!
//! This module provides the interpolation kernels used when resampling
//! images during geometric transformations and sub-pixel tracking.
//!
//! # Interpolation Modes
//!
//! - **Nearest**: Fastest, uses nearest pixel value (no interpolation)
//! - **Bilinear**: Weighted blend of the four nearest grid neighbours
//!
//! Both kernels replicate the border: coordinates outside of the image are
//! clamped to the closest valid pixel. Callers that need a background value
//! for out of bounds samples (e.g. [`crate::warp::warp_backward`]) check the
//! bounds before sampling.

mod bilinear;

/// Grid generation and coordinate mapping utilities.
///
/// Functions for generating coordinate meshgrids used in image warping
/// and transformation operations.
pub mod grid;

mod interpolate;
mod nearest;

pub use bilinear::bilinear_interpolation;
pub use interpolate::{interpolate_pixel, InterpolationMode};
