use crate::parallel;
use flowarp_image::{Image, ImageError};

/// Convert an RGB8 image to grayscale using the formula:
///
/// Y = 0.299 * R + 0.587 * G + 0.114 * B
///
/// The weights are applied in 8-bit fixed point (77, 150, 29) / 256.
///
/// # Arguments
///
/// * `src` - The input RGB8 image.
/// * `dst` - The output grayscale image.
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use flowarp_image::Image;
/// use flowarp_imgproc::color::gray_from_rgb_u8;
///
/// let rgb = Image::<u8, 3>::new([2, 1].into(), vec![255, 255, 255, 0, 0, 0]).unwrap();
/// let mut gray = Image::<u8, 1>::from_size_val(rgb.size(), 0).unwrap();
///
/// gray_from_rgb_u8(&rgb, &mut gray).unwrap();
/// assert_eq!(gray.as_slice(), &[255, 0]);
/// ```
pub fn gray_from_rgb_u8(src: &Image<u8, 3>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let r = src_pixel[0] as u16;
        let g = src_pixel[1] as u16;
        let b = src_pixel[2] as u16;
        dst_pixel[0] = ((r * 77 + g * 150 + b * 29 + 128) >> 8).min(255) as u8;
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_from_primaries() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let rgb = Image::<u8, 3>::new(
            [4, 1].into(),
            vec![
                255, 0, 0,
                0, 255, 0,
                0, 0, 255,
                128, 128, 128,
            ],
        )?;
        let mut gray = Image::<u8, 1>::from_size_val(rgb.size(), 0)?;
        gray_from_rgb_u8(&rgb, &mut gray)?;
        assert_eq!(gray.as_slice(), &[77, 149, 29, 128]);
        Ok(())
    }

    #[test]
    fn gray_size_mismatch() -> Result<(), ImageError> {
        let rgb = Image::<u8, 3>::from_size_val([4, 2].into(), 0)?;
        let mut gray = Image::<u8, 1>::from_size_val([2, 4].into(), 0)?;
        assert!(gray_from_rgb_u8(&rgb, &mut gray).is_err());
        Ok(())
    }
}
