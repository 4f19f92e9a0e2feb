use crate::{Image, ImageError, ImageSize};

/// Place two images of the same height side by side.
///
/// The result has the width of both inputs combined; the left image occupies
/// the first `left.width()` columns of every row.
///
/// # Errors
///
/// Returns [`ImageError::InvalidImageSize`] when the heights differ.
///
/// ```
/// use flowarp_image::{Image, ImageSize};
/// use flowarp_image::ops::hconcat;
///
/// let left = Image::<u8, 1>::new([1, 2].into(), vec![1, 2]).unwrap();
/// let right = Image::<u8, 1>::new([2, 2].into(), vec![3, 4, 5, 6]).unwrap();
///
/// let pair = hconcat(&left, &right).unwrap();
/// assert_eq!(pair.size(), ImageSize { width: 3, height: 2 });
/// assert_eq!(pair.as_slice(), &[1, 3, 4, 2, 5, 6]);
/// ```
pub fn hconcat<T, const C: usize>(
    left: &Image<T, C>,
    right: &Image<T, C>,
) -> Result<Image<T, C>, ImageError>
where
    T: Copy,
{
    if left.height() != right.height() {
        return Err(ImageError::InvalidImageSize(
            left.width(),
            left.height(),
            right.width(),
            right.height(),
        ));
    }

    let left_stride = left.width() * C;
    let right_stride = right.width() * C;
    let mut data = Vec::with_capacity((left_stride + right_stride) * left.height());

    if left_stride == 0 {
        data.extend_from_slice(right.as_slice());
    } else if right_stride == 0 {
        data.extend_from_slice(left.as_slice());
    } else {
        left.as_slice()
            .chunks_exact(left_stride)
            .zip(right.as_slice().chunks_exact(right_stride))
            .for_each(|(l, r)| {
                data.extend_from_slice(l);
                data.extend_from_slice(r);
            });
    }

    Image::new(
        ImageSize {
            width: left.width() + right.width(),
            height: left.height(),
        },
        data,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hconcat_rgb() -> Result<(), ImageError> {
        let left = Image::<u8, 3>::from_size_val([2, 2].into(), 10)?;
        let right = Image::<u8, 3>::from_size_val([1, 2].into(), 20)?;

        let pair = hconcat(&left, &right)?;
        assert_eq!(pair.width(), 3);
        assert_eq!(pair.height(), 2);
        assert_eq!(pair.pixel(1, 1)?, &[10, 10, 10]);
        assert_eq!(pair.pixel(2, 1)?, &[20, 20, 20]);
        Ok(())
    }

    #[test]
    fn hconcat_height_mismatch() -> Result<(), ImageError> {
        let left = Image::<u8, 1>::from_size_val([2, 2].into(), 0)?;
        let right = Image::<u8, 1>::from_size_val([2, 3].into(), 0)?;
        assert_eq!(
            hconcat(&left, &right),
            Err(ImageError::InvalidImageSize(2, 2, 2, 3))
        );
        Ok(())
    }
}
