/// Create a box blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
///
/// # Returns
///
/// A vector of the kernel.
pub fn box_blur_kernel_1d(kernel_size: usize) -> Vec<f32> {
    vec![1.0 / kernel_size as f32; kernel_size]
}

/// The 5-tap binomial kernel `[1 4 6 4 1] / 16` used to smooth a pyramid
/// level before decimation.
///
/// Applied separably it equals the classic 5x5 pyramid kernel:
///
/// ```text
/// [ 1  4  6  4  1 ]
/// [ 4 16 24 16  4 ]
/// [ 6 24 36 24  6 ] / 256
/// [ 4 16 24 16  4 ]
/// [ 1  4  6  4  1 ]
/// ```
pub fn pyramid_kernel_1d() -> [f32; 5] {
    [1.0 / 16.0, 4.0 / 16.0, 6.0 / 16.0, 4.0 / 16.0, 1.0 / 16.0]
}

/// Separable factors of the normalized 3x3 sobel operator.
///
/// Returns `(derivative, smoothing)`: the derivative factor is applied along
/// the differentiated axis and the smoothing factor along the other one. The
/// outer product is the sobel kernel divided by 8, so a unit ramp gives a
/// gradient of one.
pub fn normalized_sobel_kernel3() -> ([f32; 3], [f32; 3]) {
    ([-0.5, 0.0, 0.5], [0.25, 0.5, 0.25])
}
