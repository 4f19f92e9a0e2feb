use crate::parallel;
use flowarp_image::{Image, ImageError};

/// Add two 8-bit images value by value, saturating at 255.
///
/// # Arguments
///
/// * `src1` - The first input image.
/// * `src2` - The second input image.
/// * `dst` - The output image.
///
/// # Example
///
/// ```
/// use flowarp_image::Image;
/// use flowarp_imgproc::core::add_saturating;
///
/// let a = Image::<u8, 1>::new([2, 1].into(), vec![100, 200]).unwrap();
/// let b = Image::<u8, 1>::new([2, 1].into(), vec![100, 100]).unwrap();
/// let mut sum = Image::<u8, 1>::from_size_val(a.size(), 0).unwrap();
///
/// add_saturating(&a, &b, &mut sum).unwrap();
/// assert_eq!(sum.as_slice(), &[200, 255]);
/// ```
pub fn add_saturating<const C: usize>(
    src1: &Image<u8, C>,
    src2: &Image<u8, C>,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    for other in [src2.size(), dst.size()] {
        if src1.size() != other {
            return Err(ImageError::InvalidImageSize(
                src1.cols(),
                src1.rows(),
                other.width,
                other.height,
            ));
        }
    }

    parallel::par_iter_rows_val_two(src1, src2, dst, |&a, &b, out| {
        *out = a.saturating_add(b);
    });

    Ok(())
}
