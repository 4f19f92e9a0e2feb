//! Filter operations
//!
//! Separable filtering with replicated borders, and the derivative and box
//! filters built on it that the feature selector and the tracker need.

/// Filter kernels
pub mod kernels;

/// Filter operations
mod ops;
pub use ops::*;

/// Separable filter operations
mod separable_filter;
pub use separable_filter::*;
