#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//! The crate offers a stateless flow kernel ([`calc_optical_flow_pyr_lk`]) and
//! a frame-by-frame [`TrackingSession`] built on it that seeds points with the
//! Shi-Tomasi selector, follows them and renders their trails.

/// pyramidal Lucas-Kanade optical flow.
pub mod lucas_kanade;

/// stateful point tracking across a video.
pub mod session;

/// rendering of the tracked points and their trails.
pub mod trail;

pub use lucas_kanade::{
    calc_optical_flow_pyr_lk, FlowResult, LostReason, LucasKanadeParams, TrackStatus,
};
pub use session::{
    LostTrack, SessionConfig, SessionState, TrackMotion, TrackPoint, TrackSet, TrackUpdate,
    TrackingSession,
};
pub use trail::TrailStyle;
