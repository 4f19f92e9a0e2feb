use flowarp_image::{Image, ImageDtype, ImageError};
use rayon::prelude::*;

use crate::filter::{box_blur, spatial_gradient};
use crate::parallel;

/// The averaged structure tensor `[[sxx, sxy], [sxy, syy]]` of every pixel.
struct StructureTensor {
    sxx: Image<f32, 1>,
    syy: Image<f32, 1>,
    sxy: Image<f32, 1>,
}

impl StructureTensor {
    fn compute<T: ImageDtype>(src: &Image<T, 1>, block_size: usize) -> Result<Self, ImageError> {
        let size = src.size();

        let mut dx = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let mut dy = Image::<f32, 1>::from_size_val(size, 0.0)?;
        spatial_gradient(src, &mut dx, &mut dy)?;

        let mut dxx = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let mut dyy = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let mut dxy = Image::<f32, 1>::from_size_val(size, 0.0)?;
        parallel::par_iter_rows_val_two(&dx, &dx, &mut dxx, |a, b, out| *out = a * b);
        parallel::par_iter_rows_val_two(&dy, &dy, &mut dyy, |a, b, out| *out = a * b);
        parallel::par_iter_rows_val_two(&dx, &dy, &mut dxy, |a, b, out| *out = a * b);

        let kernel_size = (block_size, block_size);
        let mut sxx = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let mut syy = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let mut sxy = Image::<f32, 1>::from_size_val(size, 0.0)?;
        box_blur(&dxx, &mut sxx, kernel_size)?;
        box_blur(&dyy, &mut syy, kernel_size)?;
        box_blur(&dxy, &mut sxy, kernel_size)?;

        Ok(Self { sxx, syy, sxy })
    }
}

/// Compute the Shi-Tomasi cornerness map.
///
/// The image gradients are taken with the normalized sobel operator, their
/// products are averaged over a `block_size x block_size` window and every
/// pixel gets the minimum eigenvalue of the resulting 2x2 tensor.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, 1).
/// * `dst` - The response map with shape (H, W, 1).
/// * `block_size` - The side of the averaging window.
pub fn shi_tomasi_response<T: ImageDtype>(
    src: &Image<T, 1>,
    dst: &mut Image<f32, 1>,
    block_size: usize,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    if block_size == 0 {
        return Err(ImageError::InvalidParameter(
            "block_size must be positive".into(),
        ));
    }

    let tensor = StructureTensor::compute(src, block_size)?;

    dst.as_slice_mut()
        .par_iter_mut()
        .zip(tensor.sxx.as_slice().par_iter())
        .zip(tensor.syy.as_slice().par_iter())
        .zip(tensor.sxy.as_slice().par_iter())
        .for_each(|(((out, &a), &c), &b)| *out = min_eigenvalue(a, b, c));

    Ok(())
}

/// The smaller eigenvalue of the symmetric matrix `[[a, b], [b, c]]`.
pub fn min_eigenvalue(a: f32, b: f32, c: f32) -> f32 {
    let half_trace = 0.5 * (a + c);
    let half_diff = 0.5 * (a - c);
    half_trace - (half_diff * half_diff + b * b).sqrt()
}
