use rayon::prelude::*;

use flowarp_image::Image;

/// Apply a function to each pixel in the image in parallel.
///
/// The callback receives the source pixel (all `C1` channels) and the
/// destination pixel (all `C2` channels) at the same location.
pub fn par_iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) where
    T1: Clone + Send + Sync,
    T2: Clone + Send + Sync,
{
    let cols = src.cols();
    if cols == 0 || C1 == 0 || C2 == 0 {
        return;
    }

    src.as_slice()
        .par_chunks_exact(C1 * cols)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C2 * cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .chunks_exact(C1)
                .zip(dst_chunk.chunks_exact_mut(C2))
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });
}

/// Apply a function to each value of two images in parallel.
pub fn par_iter_rows_val_two<T1, T2, T3, const C: usize>(
    src1: &Image<T1, C>,
    src2: &Image<T2, C>,
    dst: &mut Image<T3, C>,
    f: impl Fn(&T1, &T2, &mut T3) + Send + Sync,
) where
    T1: Clone + Send + Sync,
    T2: Clone + Send + Sync,
    T3: Clone + Send + Sync,
{
    let stride = C * src1.cols();
    if stride == 0 {
        return;
    }

    src1.as_slice()
        .par_chunks_exact(stride)
        .zip(src2.as_slice().par_chunks_exact(stride))
        .zip(dst.as_slice_mut().par_chunks_exact_mut(stride))
        .for_each(|((src1_chunk, src2_chunk), dst_chunk)| {
            src1_chunk
                .iter()
                .zip(src2_chunk.iter())
                .zip(dst_chunk.iter_mut())
                .for_each(|((src1_val, src2_val), dst_val)| {
                    f(src1_val, src2_val, dst_val);
                });
        });
}

/// Apply a function to each pixel for grid sampling in parallel.
///
/// `map_x` and `map_y` hold, for every destination pixel, the source
/// coordinate to sample from.
pub fn par_iter_rows_resample<T, const C: usize>(
    dst: &mut Image<T, C>,
    map_x: &Image<f32, 1>,
    map_y: &Image<f32, 1>,
    f: impl Fn(&f32, &f32, &mut [T]) + Send + Sync,
) where
    T: Send + Sync,
{
    let cols = dst.cols();
    if cols == 0 || C == 0 {
        return;
    }

    dst.as_slice_mut()
        .par_chunks_exact_mut(C * cols)
        .zip(map_x.as_slice().par_chunks_exact(cols))
        .zip(map_y.as_slice().par_chunks_exact(cols))
        .for_each(|((dst_chunk, map_x_chunk), map_y_chunk)| {
            dst_chunk
                .chunks_exact_mut(C)
                .zip(map_x_chunk.iter().zip(map_y_chunk.iter()))
                .for_each(|(dst_pixel, (x, y))| {
                    f(x, y, dst_pixel);
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowarp_image::ImageError;

    #[test]
    fn rows_two_sum() -> Result<(), ImageError> {
        let a = Image::<u8, 1>::new([2, 2].into(), vec![1, 2, 3, 4])?;
        let b = Image::<u8, 1>::new([2, 2].into(), vec![10, 20, 30, 40])?;
        let mut dst = Image::<u8, 1>::from_size_val([2, 2].into(), 0)?;
        par_iter_rows_val_two(&a, &b, &mut dst, |x, y, d| *d = x + y);
        assert_eq!(dst.as_slice(), &[11, 22, 33, 44]);
        Ok(())
    }

    #[test]
    fn rows_empty_image_is_noop() -> Result<(), ImageError> {
        let src = Image::<u8, 3>::new([0, 0].into(), vec![])?;
        let mut dst = Image::<u8, 1>::new([0, 0].into(), vec![])?;
        par_iter_rows(&src, &mut dst, |_, _| unreachable!());
        Ok(())
    }
}
