//! Geometric warping of whole frames.
//!
//! A warp is described by an [`AffineTransform`]: a rotation about a center,
//! an isotropic scale about the same center and a final translation. Two
//! strategies apply it to an image:
//!
//! - **Forward** ([`warp_forward`]): every source pixel is pushed to its
//!   rounded destination cell. Simple, but the output has holes.
//! - **Backward** ([`warp_backward`]): every destination pixel pulls an
//!   interpolated sample from its inverse-mapped source position, so no cell
//!   is left unset.
//!
//! Pixels with no valid source take the background value `T::default()`.

mod backward;
mod forward;
mod transform;

pub use backward::warp_backward;
pub use forward::warp_forward;
pub use transform::{get_rotation_matrix2d, invert_affine_transform, AffineTransform};

use crate::interpolation::InterpolationMode;
use flowarp_image::{Image, ImageDtype, ImageError};

/// The strategy used to apply a transform to an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WarpMode {
    /// Scatter source pixels to their rounded destination.
    Forward,
    /// Gather interpolated samples from the inverse-mapped source position.
    Backward(InterpolationMode),
}

impl Default for WarpMode {
    fn default() -> Self {
        WarpMode::Backward(InterpolationMode::Bilinear)
    }
}

/// Warp an image into a newly allocated frame of the same size.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `transform` - The transform mapping source to destination coordinates.
/// * `mode` - The warping strategy.
///
/// # Returns
///
/// The warped image.
///
/// # Example
///
/// ```
/// use flowarp_image::Image;
/// use flowarp_imgproc::warp::{warp, AffineTransform, WarpMode};
///
/// let src = Image::<u8, 1>::new([2, 2].into(), vec![1, 2, 3, 4]).unwrap();
/// let dst = warp(&src, &AffineTransform::identity(), WarpMode::Forward).unwrap();
/// assert_eq!(dst, src);
/// ```
pub fn warp<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    transform: &AffineTransform,
    mode: WarpMode,
) -> Result<Image<T, C>, ImageError> {
    let mut dst = Image::from_size_val(src.size(), T::default())?;
    match mode {
        WarpMode::Forward => warp_forward(src, &mut dst, transform)?,
        WarpMode::Backward(interpolation) => {
            warp_backward(src, &mut dst, transform, interpolation)?
        }
    }
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowarp_image::ImageSize;

    #[test]
    fn forward_and_backward_agree_on_translation() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 6,
            height: 4,
        };
        let src = Image::<u8, 1>::new(size, (1..=24).collect())?;
        let t = AffineTransform::identity().with_translation(2.0, 1.0);

        let forward = warp(&src, &t, WarpMode::Forward)?;
        let backward = warp(&src, &t, WarpMode::default())?;
        assert_eq!(forward, backward);
        assert_eq!(*forward.get_pixel(2, 1, 0)?, 1);
        assert_eq!(*forward.get_pixel(0, 0, 0)?, 0);
        Ok(())
    }

    #[test]
    fn backward_fills_holes_left_by_forward() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::from_size_val([20, 20].into(), 100)?;
        let t = AffineTransform::new((10.0, 10.0), 45.0, 1.0);

        let forward = warp(&src, &t, WarpMode::Forward)?;
        let backward = warp(&src, &t, WarpMode::Backward(InterpolationMode::Nearest))?;

        // the central disc is inside the source for every angle
        let interior_holes = |img: &Image<u8, 1>| -> Result<usize, ImageError> {
            let mut holes = 0;
            for y in 4..16 {
                for x in 4..16 {
                    if *img.get_pixel(x, y, 0)? == 0 {
                        holes += 1;
                    }
                }
            }
            Ok(holes)
        };

        assert!(interior_holes(&forward)? > 0);
        assert_eq!(interior_holes(&backward)?, 0);
        Ok(())
    }
}
