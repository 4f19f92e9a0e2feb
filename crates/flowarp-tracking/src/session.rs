use flowarp_image::{Image, ImageError};
use flowarp_imgproc::{
    color::gray_from_rgb_u8,
    features::{good_features_to_track, GoodFeaturesParams},
};

use crate::lucas_kanade::{calc_optical_flow_pyr_lk, LostReason, LucasKanadeParams, TrackStatus};
use crate::trail::{draw_segment, render_overlay, TrailStyle};

/// A tracked point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackPoint {
    /// Identity assigned when the point was seeded, kept for its whole life.
    pub id: usize,
    /// The `(x, y)` position in the last processed frame.
    pub position: [f32; 2],
}

/// The points of a session together with the frame they were last matched in
/// and the trail canvas drawn so far.
#[derive(Debug, Clone, Default)]
pub struct TrackSet {
    points: Vec<TrackPoint>,
    prev_gray: Option<Image<u8, 1>>,
    trail: Option<Image<u8, 3>>,
}

impl TrackSet {
    /// The active points, in seeding order.
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// The number of active points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when no point is active.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The grayscale frame the points were last matched in.
    pub fn prev_frame(&self) -> Option<&Image<u8, 1>> {
        self.prev_gray.as_ref()
    }

    /// The accumulated trail canvas.
    pub fn trail(&self) -> Option<&Image<u8, 3>> {
        self.trail.as_ref()
    }

    fn clear(&mut self) {
        self.points.clear();
        self.prev_gray = None;
        self.trail = None;
    }
}

/// Lifecycle of a [`TrackingSession`].
///
/// Losing every point also drops the previous frame; the trail is kept for
/// display until the next reseed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No point was seeded since the session started or was reset.
    #[default]
    Uninitialized,
    /// Points are being followed.
    Tracking,
    /// Every point was lost; nothing happens until the next reseed.
    Lost,
}

/// Configuration of a [`TrackingSession`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionConfig {
    /// How points are seeded.
    pub features: GoodFeaturesParams,
    /// How points are followed.
    pub flow: LucasKanadeParams,
    /// How trails are drawn.
    pub trail: TrailStyle,
}

/// A point that was followed from one frame to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackMotion {
    /// The identity of the point.
    pub id: usize,
    /// Position in the previous frame.
    pub from: [f32; 2],
    /// Position in the current frame.
    pub to: [f32; 2],
}

/// A point dropped by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LostTrack {
    /// The identity of the point.
    pub id: usize,
    /// Why it was dropped.
    pub reason: LostReason,
}

/// The outcome of one [`TrackingSession::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackUpdate {
    /// The points still active, with their motion.
    pub tracked: Vec<TrackMotion>,
    /// The points dropped.
    pub lost: Vec<LostTrack>,
}

/// Follows feature points across the frames of a video.
///
/// A session seeds points with [`good_features_to_track`] and follows them
/// with [`calc_optical_flow_pyr_lk`], dropping those that cannot be followed.
/// Once every point is lost the session stays [`SessionState::Lost`] until it
/// is reseeded, typically after [`TrackingSession::reset`].
///
/// # Example
///
/// ```
/// use flowarp_image::Image;
/// use flowarp_tracking::{SessionConfig, SessionState, TrackingSession};
///
/// let mut session = TrackingSession::new(SessionConfig::default());
/// let frame = Image::<u8, 3>::from_size_val([64, 48].into(), 30).unwrap();
///
/// // a featureless frame seeds nothing
/// let display = session.process_frame(&frame).unwrap();
/// assert_eq!(display.size(), frame.size());
/// assert_eq!(session.state(), SessionState::Lost);
/// ```
#[derive(Debug, Clone)]
pub struct TrackingSession {
    config: SessionConfig,
    tracks: TrackSet,
    state: SessionState,
    reseed_pending: bool,
}

impl TrackingSession {
    /// Create a session that seeds points on its first frame.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            tracks: TrackSet::default(),
            state: SessionState::Uninitialized,
            reseed_pending: true,
        }
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The active points and their context.
    pub fn tracks(&self) -> &TrackSet {
        &self.tracks
    }

    /// True when the next [`TrackingSession::process_frame`] reseeds.
    pub fn reseed_pending(&self) -> bool {
        self.reseed_pending
    }

    /// Discard every point and the trail, and seed new points on `gray`.
    ///
    /// Points get the ids `0..n` in the order they were selected. The session
    /// is [`SessionState::Tracking`] afterwards, or [`SessionState::Lost`]
    /// when the frame has no feature.
    ///
    /// # Returns
    ///
    /// The number of seeded points.
    pub fn reseed(&mut self, gray: &Image<u8, 1>) -> Result<usize, ImageError> {
        let corners = good_features_to_track(gray, &self.config.features)?;
        let trail = Image::<u8, 3>::from_size_val(gray.size(), 0)?;

        self.tracks.clear();
        self.tracks.points = corners
            .into_iter()
            .enumerate()
            .map(|(id, position)| TrackPoint { id, position })
            .collect();
        self.tracks.prev_gray = Some(gray.clone());
        self.tracks.trail = Some(trail);
        self.reseed_pending = false;

        self.state = if self.tracks.is_empty() {
            SessionState::Lost
        } else {
            SessionState::Tracking
        };

        log::info!(
            "seeded {} points on a {} frame, session is {:?}",
            self.tracks.len(),
            gray.size(),
            self.state
        );

        Ok(self.tracks.len())
    }

    /// Follow the active points into `gray`.
    ///
    /// Outside of [`SessionState::Tracking`] nothing is computed and an empty
    /// update is returned. Points that cannot be followed are dropped, the
    /// others keep their id and get a trail segment.
    ///
    /// # Errors
    ///
    /// Returns an error when `gray` differs in size from the previous frame;
    /// the session is left as it was.
    pub fn update(&mut self, gray: &Image<u8, 1>) -> Result<TrackUpdate, ImageError> {
        if self.state != SessionState::Tracking || self.tracks.is_empty() {
            return Ok(TrackUpdate::default());
        }

        let Some(prev) = self.tracks.prev_gray.as_ref() else {
            return Ok(TrackUpdate::default());
        };

        let positions = self
            .tracks
            .points
            .iter()
            .map(|p| p.position)
            .collect::<Vec<_>>();
        let results = calc_optical_flow_pyr_lk(prev, gray, &positions, &self.config.flow)?;

        let mut update = TrackUpdate::default();
        let mut survivors = Vec::with_capacity(self.tracks.len());
        for (point, result) in self.tracks.points.iter().zip(results.iter()) {
            match result.status {
                TrackStatus::Found => {
                    update.tracked.push(TrackMotion {
                        id: point.id,
                        from: point.position,
                        to: result.position,
                    });
                    survivors.push(TrackPoint {
                        id: point.id,
                        position: result.position,
                    });
                }
                TrackStatus::Lost(reason) => update.lost.push(LostTrack {
                    id: point.id,
                    reason,
                }),
            }
        }

        if let Some(trail) = self.tracks.trail.as_mut() {
            for motion in update.tracked.iter() {
                draw_segment(trail, motion.from, motion.to, &self.config.trail);
            }
        }

        self.tracks.points = survivors;
        self.tracks.prev_gray = Some(gray.clone());

        log::debug!(
            "tracked {} points, lost {}",
            update.tracked.len(),
            update.lost.len()
        );

        if self.tracks.is_empty() {
            self.tracks.prev_gray = None;
            self.state = SessionState::Lost;
            log::info!("every point was lost, waiting for a reseed");
        }

        Ok(update)
    }

    /// Drop every point and the trail; the next frame reseeds.
    pub fn reset(&mut self) {
        self.tracks.clear();
        self.state = SessionState::Uninitialized;
        self.reseed_pending = true;
        log::info!("session reset, reseeding on the next frame");
    }

    /// Process one color frame of the video.
    ///
    /// The frame is converted to grayscale, then points are reseeded when a
    /// reseed is pending or followed otherwise.
    ///
    /// # Returns
    ///
    /// The frame with a dot at every active point and the trail drawn on top.
    pub fn process_frame(&mut self, frame: &Image<u8, 3>) -> Result<Image<u8, 3>, ImageError> {
        let mut gray = Image::<u8, 1>::from_size_val(frame.size(), 0)?;
        gray_from_rgb_u8(frame, &mut gray)?;

        if self.reseed_pending {
            self.reseed(&gray)?;
        } else {
            self.update(&gray)?;
        }

        let positions = self.tracks.points.iter().map(|p| p.position);
        match self.tracks.trail.as_ref() {
            Some(trail) if trail.size() == frame.size() => {
                render_overlay(frame, trail, positions, &self.config.trail)
            }
            _ => {
                let blank = Image::<u8, 3>::from_size_val(frame.size(), 0)?;
                render_overlay(frame, &blank, positions, &self.config.trail)
            }
        }
    }
}
