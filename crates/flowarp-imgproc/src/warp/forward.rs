use flowarp_image::{Image, ImageError};

use super::AffineTransform;

/// Warps an image by scattering every source pixel to its forward-mapped
/// destination cell.
///
/// Source pixels are visited in row-major order. Each destination coordinate
/// is rounded to the nearest cell (halves away from zero) and the pixel is
/// copied there when the cell lies inside `dst`; several sources landing on
/// the same cell resolve to the last one written. Cells that receive no pixel
/// keep the background value (`T::default()`), so rotations and upscales leave
/// visible holes in the output.
///
/// # Arguments
///
/// * `src` - The input image with shape (height, width, channels).
/// * `dst` - The output image, same shape as `src`. It is cleared first.
/// * `transform` - The transform applied to the source coordinates.
///
/// # Errors
///
/// Returns [`ImageError::InvalidImageSize`] when `dst` and `src` differ in size.
///
/// # Example
///
/// ```
/// use flowarp_image::{Image, ImageSize};
/// use flowarp_imgproc::warp::{warp_forward, AffineTransform};
///
/// let src = Image::<u8, 1>::new([3, 1].into(), vec![1, 2, 3]).unwrap();
/// let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0).unwrap();
///
/// let shift = AffineTransform::identity().with_translation(1.0, 0.0);
/// warp_forward(&src, &mut dst, &shift).unwrap();
///
/// assert_eq!(dst.as_slice(), &[0, 1, 2]);
/// ```
pub fn warp_forward<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    transform: &AffineTransform,
) -> Result<(), ImageError>
where
    T: Copy + Default,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    dst.fill(T::default());

    let (cols, rows) = (src.cols(), src.rows());
    let src_data = src.as_slice();
    let dst_data = dst.as_slice_mut();

    let mut num_written = 0usize;

    // NOTE: sequential on purpose, the scatter order decides which source wins a cell
    for y in 0..rows {
        for x in 0..cols {
            let (u, v) = transform.forward(x as f64, y as f64);
            let (u, v) = (u.round(), v.round());

            if u >= 0.0 && u < cols as f64 && v >= 0.0 && v < rows as f64 {
                let src_idx = (y * cols + x) * C;
                let dst_idx = (v as usize * cols + u as usize) * C;
                dst_data[dst_idx..dst_idx + C].copy_from_slice(&src_data[src_idx..src_idx + C]);
                num_written += 1;
            }
        }
    }

    log::trace!(
        "forward warp wrote {} of {} source pixels",
        num_written,
        rows * cols
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowarp_image::ImageSize;

    #[test]
    fn forward_identity_is_pixel_identical() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 5,
            height: 4,
        };
        let src = Image::<u8, 3>::new(size, (0..60).map(|x| x as u8 * 4).collect())?;
        let mut dst = Image::<u8, 3>::from_size_val(size, 99)?;

        warp_forward(&src, &mut dst, &AffineTransform::identity())?;
        assert_eq!(dst, src);
        Ok(())
    }

    #[test]
    fn forward_rotation_leaves_holes() -> Result<(), ImageError> {
        let n = 16;
        let src = Image::<u8, 1>::from_size_val([n, n].into(), 200)?;
        let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0)?;

        for angle in [10.0, 30.0, 45.0, 137.0] {
            let t = AffineTransform::new((n as f64 / 2.0, n as f64 / 2.0), angle, 1.0);
            warp_forward(&src, &mut dst, &t)?;

            // the cells around the center all have a source pixel inside the frame
            let mut interior_holes = 0;
            for y in 4..12 {
                for x in 4..12 {
                    if *dst.get_pixel(x, y, 0)? == 0 {
                        interior_holes += 1;
                    }
                }
            }
            assert!(interior_holes >= 1, "angle {angle} left no interior hole");
        }
        Ok(())
    }

    #[test]
    fn forward_last_write_wins() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::new([4, 1].into(), vec![10, 20, 30, 40])?;
        let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0)?;

        // x -> 0.5 x: 0 -> 0, 1 -> 1 (0.5 rounds up), 2 -> 1, 3 -> 2
        let t = AffineTransform::new((0.0, 0.0), 0.0, 0.5);
        warp_forward(&src, &mut dst, &t)?;
        assert_eq!(dst.as_slice(), &[10, 30, 40, 0]);
        Ok(())
    }

    #[test]
    fn forward_skips_out_of_bounds() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::new([2, 2].into(), vec![1, 2, 3, 4])?;
        let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0)?;

        let t = AffineTransform::identity().with_translation(-1.0, 1.0);
        warp_forward(&src, &mut dst, &t)?;
        assert_eq!(dst.as_slice(), &[0, 0, 2, 0]);
        Ok(())
    }

    #[test]
    fn forward_size_mismatch() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::from_size_val([2, 2].into(), 0)?;
        let mut dst = Image::<u8, 1>::from_size_val([3, 2].into(), 0)?;
        assert_eq!(
            warp_forward(&src, &mut dst, &AffineTransform::identity()),
            Err(ImageError::InvalidImageSize(2, 2, 3, 2))
        );
        Ok(())
    }
}
