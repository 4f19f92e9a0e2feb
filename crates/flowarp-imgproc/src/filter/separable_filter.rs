use flowarp_image::{Image, ImageDtype, ImageError};
use rayon::prelude::*;

/// A separable 2D filter that applies horizontal and vertical 1D correlations
/// sequentially.
///
/// The kernel anchors are centered; samples that fall outside of the image
/// replicate the closest border pixel.
struct SeparableFilter<'a> {
    kernel_x: &'a [f32],
    kernel_y: &'a [f32],
    offsets_x: Vec<isize>,
    offsets_y: Vec<isize>,
}

impl<'a> SeparableFilter<'a> {
    fn new(kernel_x: &'a [f32], kernel_y: &'a [f32]) -> Self {
        let half_x = (kernel_x.len() / 2) as isize;
        let half_y = (kernel_y.len() / 2) as isize;

        Self {
            kernel_x,
            kernel_y,
            offsets_x: (0..kernel_x.len() as isize).map(|i| i - half_x).collect(),
            offsets_y: (0..kernel_y.len() as isize).map(|i| i - half_y).collect(),
        }
    }

    fn apply<T, U, const C: usize>(&self, src: &Image<T, C>, dst: &mut Image<U, C>)
    where
        T: ImageDtype,
        U: ImageDtype,
    {
        let (rows, cols) = (src.rows(), src.cols());
        if rows == 0 || cols == 0 {
            return;
        }

        let row_len = cols * C;
        let src_data = src.as_slice();
        let mut temp = vec![0.0f32; src_data.len()];

        let clamp = |i: isize, len: usize| i.clamp(0, len as isize - 1) as usize;

        // horizontal
        temp.par_chunks_exact_mut(row_len)
            .zip(src_data.par_chunks_exact(row_len))
            .for_each(|(row_temp, row_src)| {
                for c in 0..cols {
                    let mut acc = [0.0f32; C];
                    for (&k, &off) in self.kernel_x.iter().zip(self.offsets_x.iter()) {
                        let idx = clamp(c as isize + off, cols) * C;
                        for (ch, acc_val) in acc.iter_mut().enumerate() {
                            let val: f32 = row_src[idx + ch].into();
                            *acc_val += val * k;
                        }
                    }
                    row_temp[c * C..(c + 1) * C].copy_from_slice(&acc);
                }
            });

        // vertical
        dst.as_slice_mut()
            .par_chunks_exact_mut(row_len)
            .enumerate()
            .for_each(|(r, row_dst)| {
                for c in 0..cols {
                    let mut acc = [0.0f32; C];
                    for (&k, &off) in self.kernel_y.iter().zip(self.offsets_y.iter()) {
                        let idx = clamp(r as isize + off, rows) * row_len + c * C;
                        for (ch, acc_val) in acc.iter_mut().enumerate() {
                            *acc_val += temp[idx + ch] * k;
                        }
                    }
                    row_dst[c * C..(c + 1) * C]
                        .iter_mut()
                        .zip(acc.iter())
                        .for_each(|(out, &val)| *out = U::from_f32(val));
                }
            });
    }
}

/// Apply a separable filter to an image.
///
/// The source and destination types may differ, which lets a `u8` frame be
/// filtered straight into a `f32` buffer. Borders are replicated.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_x` - The horizontal kernel.
/// * `kernel_y` - The vertical kernel.
///
/// # Errors
///
/// Returns an error if a kernel is empty or the images differ in size.
pub fn separable_filter<T, U, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<U, C>,
    kernel_x: &[f32],
    kernel_y: &[f32],
) -> Result<(), ImageError>
where
    T: ImageDtype,
    U: ImageDtype,
{
    if kernel_x.is_empty() || kernel_y.is_empty() {
        return Err(ImageError::InvalidKernelLength(
            kernel_x.len(),
            kernel_y.len(),
        ));
    }

    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    SeparableFilter::new(kernel_x, kernel_y).apply(src, dst);

    Ok(())
}
