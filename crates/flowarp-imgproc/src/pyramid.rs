use crate::filter::{kernels, separable_filter};
use flowarp_image::{Image, ImageDtype, ImageError, ImageSize};
use rayon::prelude::*;

/// The size of the level below `size` in a pyramid: each side halves, rounding up.
pub fn pyrdown_size(size: ImageSize) -> ImageSize {
    ImageSize {
        width: size.width.div_ceil(2),
        height: size.height.div_ceil(2),
    }
}

/// Blur an image and then downsample it by two.
///
/// The image is smoothed with the separable 5-tap binomial kernel
/// `[1 4 6 4 1] / 16` (replicated border) and every other pixel of every other
/// row is kept.
///
/// # Arguments
///
/// * `src` - The source image to be downsampled.
/// * `dst` - The destination image, of size [`pyrdown_size`] of the source.
///
/// # Example
///
/// ```
/// use flowarp_image::{Image, ImageSize};
/// use flowarp_imgproc::pyramid::pyrdown;
///
/// let image = Image::<u8, 1>::from_size_val([5, 4].into(), 10).unwrap();
/// let mut down = Image::<f32, 1>::from_size_val([3, 2].into(), 0.0).unwrap();
///
/// pyrdown(&image, &mut down).unwrap();
/// assert!(down.as_slice().iter().all(|&v| v == 10.0));
/// ```
pub fn pyrdown<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<f32, C>,
) -> Result<(), ImageError> {
    let expected = pyrdown_size(src.size());
    if dst.size() != expected {
        return Err(ImageError::InvalidImageSize(
            expected.width,
            expected.height,
            dst.width(),
            dst.height(),
        ));
    }

    let mut blurred = Image::<f32, C>::from_size_val(src.size(), 0.0)?;
    let kernel = kernels::pyramid_kernel_1d();
    separable_filter(src, &mut blurred, &kernel, &kernel)?;

    let (src_cols, dst_cols) = (src.cols(), dst.cols());
    if dst_cols == 0 {
        return Ok(());
    }

    let blurred_data = blurred.as_slice();
    dst.as_slice_mut()
        .par_chunks_exact_mut(dst_cols * C)
        .enumerate()
        .for_each(|(r, dst_row)| {
            let src_row = &blurred_data[2 * r * src_cols * C..(2 * r + 1) * src_cols * C];
            dst_row
                .chunks_exact_mut(C)
                .zip(src_row.chunks_exact(C).step_by(2))
                .for_each(|(dst_pixel, src_pixel)| dst_pixel.copy_from_slice(src_pixel));
        });

    Ok(())
}

/// A Gaussian image pyramid of a single channel frame.
///
/// Level 0 is the frame itself converted to `f32`; level `i + 1` is
/// [`pyrdown`] of level `i`. The pyramid is rebuilt for every frame and never
/// stored across calls.
#[derive(Debug, Clone)]
pub struct ImagePyramid {
    levels: Vec<Image<f32, 1>>,
}

impl ImagePyramid {
    /// Build a pyramid with `num_levels` levels, the finest one included.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidParameter`] when `num_levels` is zero.
    pub fn build<T: ImageDtype>(src: &Image<T, 1>, num_levels: usize) -> Result<Self, ImageError> {
        if num_levels == 0 {
            return Err(ImageError::InvalidParameter(
                "a pyramid needs at least one level".into(),
            ));
        }

        let base: Vec<f32> = src.as_slice().iter().map(|&v| v.into()).collect();
        let mut levels = Vec::with_capacity(num_levels);
        levels.push(Image::new(src.size(), base)?);

        for _ in 1..num_levels {
            let Some(prev) = levels.last() else {
                break;
            };
            let mut next = Image::<f32, 1>::from_size_val(pyrdown_size(prev.size()), 0.0)?;
            pyrdown(prev, &mut next)?;
            levels.push(next);
        }

        log::trace!(
            "built pyramid with {} levels, coarsest {}",
            levels.len(),
            levels[levels.len() - 1].size()
        );

        Ok(Self { levels })
    }

    /// The number of levels.
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// The level at `index`, 0 being the finest.
    pub fn level(&self, index: usize) -> Option<&Image<f32, 1>> {
        self.levels.get(index)
    }

    /// All levels from finest to coarsest.
    pub fn levels(&self) -> &[Image<f32, 1>] {
        &self.levels
    }
}
