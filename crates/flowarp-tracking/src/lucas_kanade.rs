//! Sparse optical flow with the pyramidal Lucas-Kanade method.
//!
//! Every point is refined independently, coarse to fine. At each pyramid
//! level a window of the previous frame around the point is the template;
//! its gradients give the 2x2 spatial gradient matrix `G` and the
//! displacement is improved with Gauss-Newton steps `delta = G^-1 b` until
//! the step becomes smaller than `epsilon`. The estimate of a level, doubled,
//! seeds the next finer level.

use flowarp_image::{Image, ImageError, ImageSize};
use flowarp_imgproc::{
    features::min_eigenvalue,
    filter::spatial_gradient,
    interpolation::bilinear_interpolation,
    pyramid::{pyrdown_size, ImagePyramid},
};
use rayon::prelude::*;

/// Parameters of [`calc_optical_flow_pyr_lk`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LucasKanadeParams {
    /// Side of the square matching window, odd.
    pub window_size: usize,
    /// Index of the coarsest pyramid level, 0 tracks on the full frame only.
    /// Levels below a single pixel are not built.
    pub max_level: usize,
    /// Maximum number of refinement steps per level.
    pub max_iterations: usize,
    /// A level stops refining once a step is shorter than this, in pixels.
    pub epsilon: f32,
    /// Points whose normalized minimum eigenvalue of `G` falls below this are
    /// lost to the aperture problem.
    pub min_eigen_threshold: f32,
    /// Points whose mean absolute intensity difference over the window
    /// exceeds this are lost.
    pub max_residual: f32,
}

impl Default for LucasKanadeParams {
    fn default() -> Self {
        Self {
            window_size: 15,
            max_level: 2,
            max_iterations: 10,
            epsilon: 0.03,
            min_eigen_threshold: 1e-4,
            max_residual: 50.0,
        }
    }
}

impl LucasKanadeParams {
    fn validate(&self) -> Result<(), ImageError> {
        if self.window_size < 3 || self.window_size % 2 == 0 {
            return Err(ImageError::InvalidParameter(format!(
                "window_size must be odd and at least 3, got {}",
                self.window_size
            )));
        }
        if self.max_iterations == 0 {
            return Err(ImageError::InvalidParameter(
                "max_iterations must be positive".into(),
            ));
        }
        if self.epsilon.is_nan() || self.epsilon < 0.0 {
            return Err(ImageError::InvalidParameter(format!(
                "epsilon must be non negative, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Why a point could not be tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LostReason {
    /// The estimate left the frame.
    OutOfBounds,
    /// The window lacks gradients in two directions.
    Aperture,
    /// The matched window differs too much from the template.
    Residual,
}

/// The outcome of tracking one point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackStatus {
    /// The point was followed into the next frame.
    Found,
    /// The point was lost.
    Lost(LostReason),
}

impl TrackStatus {
    /// True when the point was followed.
    pub fn is_found(&self) -> bool {
        matches!(self, TrackStatus::Found)
    }
}

/// The tracking result of a single point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowResult {
    /// The estimated `(x, y)` position in the next frame. For a lost point it
    /// is the last estimate reached before giving up.
    pub position: [f32; 2],
    /// Whether the point was found.
    pub status: TrackStatus,
    /// Mean absolute intensity difference between the template and the
    /// matched window, zero when the point was lost before matching.
    pub residual: f32,
}

/// One pyramid level of the previous frame with its gradients, and the same
/// level of the next frame.
struct Level<'a> {
    prev: &'a Image<f32, 1>,
    next: &'a Image<f32, 1>,
    grad_x: Image<f32, 1>,
    grad_y: Image<f32, 1>,
}

impl Level<'_> {
    fn contains(&self, x: f32, y: f32) -> bool {
        let (max_x, max_y) = ((self.prev.cols() - 1) as f32, (self.prev.rows() - 1) as f32);
        // written positively so that NaN counts as outside
        x >= 0.0 && x <= max_x && y >= 0.0 && y <= max_y
    }
}

fn sample(image: &Image<f32, 1>, x: f32, y: f32) -> f32 {
    bilinear_interpolation(image, x, y)[0]
}

/// The template window around a point, sampled once per level.
struct Template {
    offsets: Vec<(f32, f32)>,
    values: Vec<f32>,
    grad_x: Vec<f32>,
    grad_y: Vec<f32>,
}

impl Template {
    fn sample(level: &Level, center: [f32; 2], offsets: &[(f32, f32)]) -> Self {
        let at = |img: &Image<f32, 1>| {
            offsets
                .iter()
                .map(|&(dx, dy)| sample(img, center[0] + dx, center[1] + dy))
                .collect::<Vec<_>>()
        };

        Self {
            offsets: offsets.to_vec(),
            values: at(level.prev),
            grad_x: at(&level.grad_x),
            grad_y: at(&level.grad_y),
        }
    }

    /// The spatial gradient matrix `[[gxx, gxy], [gxy, gyy]]`.
    fn gradient_matrix(&self) -> (f32, f32, f32) {
        self.grad_x
            .iter()
            .zip(self.grad_y.iter())
            .fold((0.0, 0.0, 0.0), |(gxx, gxy, gyy), (&ix, &iy)| {
                (gxx + ix * ix, gxy + ix * iy, gyy + iy * iy)
            })
    }

    /// The mismatch vector `b = sum((T - J(p)) * grad T)` at `center` in `image`.
    fn mismatch(&self, image: &Image<f32, 1>, center: [f32; 2]) -> (f32, f32) {
        let mut b = (0.0, 0.0);
        for (i, &(dx, dy)) in self.offsets.iter().enumerate() {
            let diff = self.values[i] - sample(image, center[0] + dx, center[1] + dy);
            b.0 += diff * self.grad_x[i];
            b.1 += diff * self.grad_y[i];
        }
        b
    }

    /// Mean absolute difference to the window at `center` in `image`.
    fn residual(&self, image: &Image<f32, 1>, center: [f32; 2]) -> f32 {
        let total = self
            .offsets
            .iter()
            .zip(self.values.iter())
            .map(|(&(dx, dy), &t)| (t - sample(image, center[0] + dx, center[1] + dy)).abs())
            .sum::<f32>();
        total / self.values.len() as f32
    }
}

/// The number of pyramid levels to build, at most `max_level + 1` and never
/// past the level where the frame is reduced to a single pixel.
fn usable_levels(size: ImageSize, max_level: usize) -> usize {
    let mut num_levels = 1;
    let mut level_size = size;
    while num_levels <= max_level && (level_size.width > 1 || level_size.height > 1) {
        level_size = pyrdown_size(level_size);
        num_levels += 1;
    }
    num_levels
}

/// Refine the displacement of one point on one level.
///
/// On failure the displacement reached so far is returned along with the
/// reason; it never carries a step that left the level.
fn refine_at_level(
    level: &Level,
    at_level: [f32; 2],
    guess: [f32; 2],
    offsets: &[(f32, f32)],
    eigen_norm: f32,
    params: &LucasKanadeParams,
) -> Result<[f32; 2], ([f32; 2], LostReason)> {
    let mut d = [0.0f32; 2];

    if !level.contains(at_level[0], at_level[1]) {
        return Err((d, LostReason::OutOfBounds));
    }

    let template = Template::sample(level, at_level, offsets);
    let (gxx, gxy, gyy) = template.gradient_matrix();

    let det = gxx * gyy - gxy * gxy;
    if min_eigenvalue(gxx, gxy, gyy) / eigen_norm < params.min_eigen_threshold
        || det <= f32::EPSILON
    {
        return Err((d, LostReason::Aperture));
    }

    for _ in 0..params.max_iterations {
        let center = [at_level[0] + guess[0] + d[0], at_level[1] + guess[1] + d[1]];
        if !level.contains(center[0], center[1]) {
            return Err((d, LostReason::OutOfBounds));
        }

        let (bx, by) = template.mismatch(level.next, center);
        let step = [(gyy * bx - gxy * by) / det, (gxx * by - gxy * bx) / det];
        let moved = [d[0] + step[0], d[1] + step[1]];

        if !level.contains(at_level[0] + guess[0] + moved[0], at_level[1] + guess[1] + moved[1]) {
            return Err((d, LostReason::OutOfBounds));
        }
        d = moved;

        if step[0] * step[0] + step[1] * step[1] < params.epsilon * params.epsilon {
            break;
        }
    }

    Ok(d)
}

fn track_point(
    point: [f32; 2],
    levels: &[Level],
    offsets: &[(f32, f32)],
    params: &LucasKanadeParams,
) -> FlowResult {
    // the minimum eigenvalue is compared for intensities scaled to [0, 1]
    let eigen_norm = offsets.len() as f32 * 255.0 * 255.0;

    let lost = |estimate: [f32; 2], reason| FlowResult {
        position: estimate,
        status: TrackStatus::Lost(reason),
        residual: 0.0,
    };

    let mut guess = [0.0f32; 2];

    for (level_idx, level) in levels.iter().enumerate().rev() {
        let finest = level_idx == 0;
        let scale = 2f32.powi(level_idx as i32);
        let at_level = [point[0] / scale, point[1] / scale];

        // coarse levels only refine the guess; a point is lost at level 0 alone
        let d = match refine_at_level(level, at_level, guess, offsets, eigen_norm, params) {
            Ok(d) => d,
            Err((d, reason)) if finest => {
                return lost(
                    [at_level[0] + guess[0] + d[0], at_level[1] + guess[1] + d[1]],
                    reason,
                );
            }
            Err((d, _)) => d,
        };

        guess = if finest {
            [guess[0] + d[0], guess[1] + d[1]]
        } else {
            [2.0 * (guess[0] + d[0]), 2.0 * (guess[1] + d[1])]
        };
    }

    let position = [point[0] + guess[0], point[1] + guess[1]];

    let residual = match levels.first() {
        Some(finest) => Template::sample(finest, point, offsets).residual(finest.next, position),
        None => 0.0,
    };

    if residual > params.max_residual {
        return FlowResult {
            position,
            status: TrackStatus::Lost(LostReason::Residual),
            residual,
        };
    }

    FlowResult {
        position,
        status: TrackStatus::Found,
        residual,
    }
}

/// Track sparse points from one frame to the next.
///
/// # Arguments
///
/// * `prev` - The frame the points were found in.
/// * `next` - The frame to find the points in, same size as `prev`.
/// * `points` - The `(x, y)` positions of the points in `prev`.
/// * `params` - The tracking parameters.
///
/// # Returns
///
/// One [`FlowResult`] per input point, in input order.
///
/// # Errors
///
/// Returns an error when the frames differ in size or the parameters are
/// invalid.
///
/// # Example
///
/// ```
/// use flowarp_image::Image;
/// use flowarp_tracking::{calc_optical_flow_pyr_lk, LostReason, LucasKanadeParams, TrackStatus};
///
/// let flat = Image::<u8, 1>::from_size_val([32, 32].into(), 40).unwrap();
/// let results =
///     calc_optical_flow_pyr_lk(&flat, &flat, &[[16.0, 16.0]], &LucasKanadeParams::default())
///         .unwrap();
///
/// assert_eq!(results[0].status, TrackStatus::Lost(LostReason::Aperture));
/// ```
pub fn calc_optical_flow_pyr_lk(
    prev: &Image<u8, 1>,
    next: &Image<u8, 1>,
    points: &[[f32; 2]],
    params: &LucasKanadeParams,
) -> Result<Vec<FlowResult>, ImageError> {
    params.validate()?;

    if prev.size() != next.size() {
        return Err(ImageError::InvalidImageSize(
            prev.cols(),
            prev.rows(),
            next.cols(),
            next.rows(),
        ));
    }

    if points.is_empty() {
        return Ok(Vec::new());
    }

    if prev.cols() == 0 || prev.rows() == 0 {
        return Err(ImageError::InvalidParameter(
            "cannot track points in an empty frame".into(),
        ));
    }

    let num_levels = usable_levels(prev.size(), params.max_level);
    let prev_pyramid = ImagePyramid::build(prev, num_levels)?;
    let next_pyramid = ImagePyramid::build(next, num_levels)?;

    let levels = prev_pyramid
        .levels()
        .iter()
        .zip(next_pyramid.levels().iter())
        .map(|(prev, next)| {
            let mut grad_x = Image::<f32, 1>::from_size_val(prev.size(), 0.0)?;
            let mut grad_y = Image::<f32, 1>::from_size_val(prev.size(), 0.0)?;
            spatial_gradient(prev, &mut grad_x, &mut grad_y)?;
            Ok::<_, ImageError>(Level {
                prev,
                next,
                grad_x,
                grad_y,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let half = (params.window_size / 2) as i32;
    let offsets = (-half..=half)
        .flat_map(|dy| (-half..=half).map(move |dx| (dx as f32, dy as f32)))
        .collect::<Vec<_>>();

    let results = points
        .par_iter()
        .map(|&point| track_point(point, &levels, &offsets, params))
        .collect::<Vec<_>>();

    log::debug!(
        "tracked {} of {} points over {} levels",
        results.iter().filter(|r| r.status.is_found()).count(),
        points.len(),
        num_levels
    );

    Ok(results)
}
