use flowarp_image::{Image, ImageDtype, ImageError};

use super::{kernels, separable_filter};

/// Blur an image using a box blur filter
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The size of the kernel (kernel_x, kernel_y).
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn box_blur<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel_size: (usize, usize),
) -> Result<(), ImageError> {
    let kernel_x = kernels::box_blur_kernel_1d(kernel_size.0);
    let kernel_y = kernels::box_blur_kernel_1d(kernel_size.1);
    separable_filter(src, dst, &kernel_x, &kernel_y)
}

/// Compute the first order image derivatives with the normalized 3x3 sobel
/// operator.
///
/// Borders are replicated, so the derivative across the image edge is
/// computed as if the outermost pixels continued.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dx` - The horizontal derivative with shape (H, W, C).
/// * `dy` - The vertical derivative with shape (H, W, C).
///
/// # Example
///
/// ```
/// use flowarp_image::Image;
/// use flowarp_imgproc::filter::spatial_gradient;
///
/// let ramp = Image::<u8, 1>::new([3, 1].into(), vec![0, 2, 4]).unwrap();
/// let mut dx = Image::<f32, 1>::from_size_val(ramp.size(), 0.0).unwrap();
/// let mut dy = dx.clone();
///
/// spatial_gradient(&ramp, &mut dx, &mut dy).unwrap();
/// assert_eq!(dx.as_slice()[1], 2.0);
/// ```
pub fn spatial_gradient<T: ImageDtype, const C: usize>(
    src: &Image<T, C>,
    dx: &mut Image<f32, C>,
    dy: &mut Image<f32, C>,
) -> Result<(), ImageError> {
    let (derivative, smoothing) = kernels::normalized_sobel_kernel3();
    separable_filter(src, dx, &derivative, &smoothing)?;
    separable_filter(src, dy, &smoothing, &derivative)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use flowarp_image::ImageSize;

    #[test]
    fn box_blur_averages() -> Result<(), ImageError> {
        let img = Image::<f32, 1>::new([3, 1].into(), vec![0.0, 3.0, 6.0])?;
        let mut dst = Image::<f32, 1>::from_size_val(img.size(), 0.0)?;
        box_blur(&img, &mut dst, (3, 1))?;
        for (v, e) in dst.as_slice().iter().zip([1.0, 3.0, 5.0]) {
            assert_relative_eq!(*v, e, epsilon = 1e-5);
        }
        Ok(())
    }

    #[test]
    fn gradient_of_ramps() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 5,
            height: 4,
        };
        // f(x, y) = 3x + 5y
        let data = (0..size.height)
            .flat_map(|y| (0..size.width).map(move |x| (3 * x + 5 * y) as f32))
            .collect();
        let img = Image::<f32, 1>::new(size, data)?;

        let mut dx = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let mut dy = Image::<f32, 1>::from_size_val(size, 0.0)?;
        spatial_gradient(&img, &mut dx, &mut dy)?;

        // interior pixels see the true slope
        for y in 1..size.height - 1 {
            for x in 1..size.width - 1 {
                assert_eq!(*dx.get_pixel(x, y, 0)?, 3.0);
                assert_eq!(*dy.get_pixel(x, y, 0)?, 5.0);
            }
        }

        // the replicated border halves the central difference
        assert_eq!(*dx.get_pixel(0, 1, 0)?, 1.5);
        Ok(())
    }

    #[test]
    fn gradient_of_constant_is_zero() -> Result<(), ImageError> {
        let img = Image::<u8, 1>::from_size_val([6, 6].into(), 128)?;
        let mut dx = Image::<f32, 1>::from_size_val(img.size(), 1.0)?;
        let mut dy = Image::<f32, 1>::from_size_val(img.size(), 1.0)?;
        spatial_gradient(&img, &mut dx, &mut dy)?;
        assert!(dx.as_slice().iter().chain(dy.as_slice()).all(|&v| v == 0.0));
        Ok(())
    }
}
