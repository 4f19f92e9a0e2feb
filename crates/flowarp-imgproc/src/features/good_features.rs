use flowarp_image::{Image, ImageError};

use super::shi_tomasi_response;

/// Parameters of [`good_features_to_track`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GoodFeaturesParams {
    /// Maximum number of points to return, zero for no limit.
    pub max_corners: usize,
    /// Fraction of the strongest response a candidate must reach.
    pub quality_level: f32,
    /// Minimum Euclidean distance between two returned points.
    pub min_distance: f32,
    /// Side of the window the structure tensor is averaged over.
    pub block_size: usize,
}

impl Default for GoodFeaturesParams {
    fn default() -> Self {
        Self {
            max_corners: 100,
            quality_level: 0.3,
            min_distance: 7.0,
            block_size: 7,
        }
    }
}

impl GoodFeaturesParams {
    fn validate(&self) -> Result<(), ImageError> {
        if !(self.quality_level > 0.0 && self.quality_level.is_finite()) {
            return Err(ImageError::InvalidParameter(format!(
                "quality_level must be positive, got {}",
                self.quality_level
            )));
        }
        if self.min_distance.is_nan() || self.min_distance < 0.0 {
            return Err(ImageError::InvalidParameter(format!(
                "min_distance must be non negative, got {}",
                self.min_distance
            )));
        }
        if self.block_size == 0 {
            return Err(ImageError::InvalidParameter(
                "block_size must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Select strong corners to track.
///
/// Every pixel is scored with [`shi_tomasi_response`].
/// Pixels scoring at least `quality_level` times the best score (and above
/// zero) are candidates. Candidates are visited from the strongest down, ties
/// in row-major order, and a candidate is accepted unless it lies closer than
/// `min_distance` to a point accepted before it. Selection stops after
/// `max_corners` points.
///
/// # Arguments
///
/// * `src` - The grayscale frame.
/// * `params` - The selection parameters.
///
/// # Returns
///
/// The `(x, y)` positions of the selected corners, strongest first. A frame
/// without any structure (e.g. constant) yields no point.
///
/// # Example
///
/// ```
/// use flowarp_image::Image;
/// use flowarp_imgproc::features::{good_features_to_track, GoodFeaturesParams};
///
/// let flat = Image::<u8, 1>::from_size_val([32, 32].into(), 90).unwrap();
/// let points = good_features_to_track(&flat, &GoodFeaturesParams::default()).unwrap();
/// assert!(points.is_empty());
/// ```
pub fn good_features_to_track(
    src: &Image<u8, 1>,
    params: &GoodFeaturesParams,
) -> Result<Vec<[f32; 2]>, ImageError> {
    params.validate()?;

    let mut response = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
    shi_tomasi_response(src, &mut response, params.block_size)?;

    let scores = response.as_slice();
    let max_score = scores.iter().copied().fold(0.0f32, f32::max);
    if max_score <= 0.0 {
        log::debug!("no corner response in a {} frame", src.size());
        return Ok(Vec::new());
    }

    let threshold = params.quality_level * max_score;
    let mut candidates = scores
        .iter()
        .enumerate()
        .filter(|(_, &score)| score >= threshold && score > 0.0)
        .map(|(idx, &score)| (idx, score))
        .collect::<Vec<_>>();

    // stable sort keeps row-major order among equal scores
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

    let max_corners = match params.max_corners {
        0 => usize::MAX,
        n => n,
    };
    let min_distance_sq = params.min_distance * params.min_distance;
    let cols = src.cols();

    let mut corners: Vec<[f32; 2]> = Vec::new();
    for (idx, _) in candidates.iter() {
        if corners.len() >= max_corners {
            break;
        }

        let point = [(idx % cols) as f32, (idx / cols) as f32];
        let too_close = corners.iter().any(|c| {
            let (dx, dy) = (c[0] - point[0], c[1] - point[1]);
            dx * dx + dy * dy < min_distance_sq
        });

        if !too_close {
            corners.push(point);
        }
    }

    log::debug!(
        "selected {} corners out of {} candidates",
        corners.len(),
        candidates.len()
    );

    Ok(corners)
}
