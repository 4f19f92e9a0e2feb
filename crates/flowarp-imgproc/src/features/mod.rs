//! Corner responses and the selection of good points to track.

mod good_features;
mod responses;

pub use good_features::{good_features_to_track, GoodFeaturesParams};
pub use responses::{min_eigenvalue, shi_tomasi_response};
