use flowarp_image::{Image, ImageDtype, ImageError};

use super::AffineTransform;
use crate::interpolation::{grid::meshgrid_from_fn, interpolate_pixel, InterpolationMode};
use crate::parallel;

// sample positions this far below zero still count as inside the source; it
// absorbs the rounding of the inverse mapping on quarter turns
const BORDER_TOLERANCE: f32 = 1e-4;

/// Warps an image by gathering, for every destination pixel, an interpolated
/// sample at its inverse-mapped source position.
///
/// Destination pixels whose source position falls outside of `src` are set to
/// the background value (`T::default()`). Every destination pixel is written,
/// so the output has no holes. A degenerate transform (see
/// [`AffineTransform::is_degenerate`]) produces an all-background image.
///
/// # Arguments
///
/// * `src` - The input image with shape (height, width, channels).
/// * `dst` - The output image, same shape as `src`.
/// * `transform` - The transform mapping source to destination coordinates.
/// * `interpolation` - The interpolation mode to use.
///
/// # Errors
///
/// Returns [`ImageError::InvalidImageSize`] when `dst` and `src` differ in size.
///
/// # Example
///
/// ```
/// use flowarp_image::{Image, ImageSize};
/// use flowarp_imgproc::interpolation::InterpolationMode;
/// use flowarp_imgproc::warp::{warp_backward, AffineTransform};
///
/// let src = Image::<_, 3>::from_size_val(
///     ImageSize {
///         width: 4,
///         height: 5,
///     },
///     1f32,
/// )
/// .unwrap();
///
/// let mut dst = Image::<_, 3>::from_size_val(src.size(), 0.0).unwrap();
///
/// warp_backward(
///     &src,
///     &mut dst,
///     &AffineTransform::identity(),
///     InterpolationMode::Bilinear,
/// )
/// .unwrap();
///
/// assert_eq!(dst.as_slice(), src.as_slice());
/// ```
pub fn warp_backward<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    transform: &AffineTransform,
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    if transform.is_degenerate() {
        log::debug!("degenerate transform, returning a background image");
        dst.fill(T::default());
        return Ok(());
    }

    // create meshgrid to find corresponding positions in src from dst
    let (dst_rows, dst_cols) = (dst.rows(), dst.cols());
    let (map_x, map_y) = meshgrid_from_fn(dst_cols, dst_rows, |x, y| {
        let (u_src, v_src) = transform.inverse(x as f64, y as f64);
        (u_src as f32, v_src as f32)
    })?;

    let (src_cols, src_rows) = (src.cols() as f32, src.rows() as f32);

    parallel::par_iter_rows_resample(dst, &map_x, &map_y, |&x, &y, dst_pixel| {
        // check if the position is within the bounds of the src image
        if x > -BORDER_TOLERANCE && x < src_cols && y > -BORDER_TOLERANCE && y < src_rows {
            let pixel = interpolate_pixel(src, x, y, interpolation);
            dst_pixel
                .iter_mut()
                .zip(pixel.iter())
                .for_each(|(out, &val)| *out = T::from_f32(val));
        } else {
            dst_pixel.iter_mut().for_each(|out| *out = T::default());
        }
    });

    Ok(())
}
