/// Inverts a 2x3 affine transformation matrix.
///
/// Arguments:
///
/// * `m` - The 2x3 affine transformation matrix in row-major order.
///
/// Returns:
///
/// The inverted 2x3 affine transformation matrix. A singular matrix yields a
/// matrix with an all-zero linear part, following OpenCV.
pub fn invert_affine_transform(m: &[f64; 6]) -> [f64; 6] {
    let (a, b, c, d, e, f) = (m[0], m[1], m[2], m[3], m[4], m[5]);

    // follow OpenCV: check for determinant == 0
    // https://github.com/opencv/opencv/blob/4.9.0/modules/imgproc/src/imgwarp.cpp#L2765
    let determinant = a * e - b * d;
    let inv_determinant = if determinant != 0.0 {
        1.0 / determinant
    } else {
        0.0
    };

    let new_a = e * inv_determinant;
    let new_b = -b * inv_determinant;
    let new_d = -d * inv_determinant;
    let new_e = a * inv_determinant;
    let new_c = -(new_a * c + new_b * f);
    let new_f = -(new_d * c + new_e * f);

    [new_a, new_b, new_c, new_d, new_e, new_f]
}

/// Returns a 2x3 rotation matrix for a 2D rotation around a center point.
///
/// The rotation matrix is defined as:
///
/// | alpha  beta  tx |
/// | -beta  alpha ty |
///
/// where:
///
/// alpha = scale * cos(angle)
/// beta = scale * sin(angle)
/// tx = (1 - alpha) * center.x - beta * center.y
/// ty = beta * center.x + (1 - alpha) * center.y
///
/// # Arguments
///
/// * `center` - The center point of the rotation.
/// * `angle` - The angle of rotation in degrees.
/// * `scale` - The scale factor.
///
/// # Example
///
/// ```
/// use flowarp_imgproc::warp::get_rotation_matrix2d;
///
/// let m = get_rotation_matrix2d((0.0, 0.0), 0.0, 2.0);
/// assert_eq!(m, [2.0, 0.0, 0.0, 0.0, 2.0, 0.0]);
/// ```
pub fn get_rotation_matrix2d(center: (f64, f64), angle: f64, scale: f64) -> [f64; 6] {
    let (sin, cos) = angle.to_radians().sin_cos();
    let alpha = scale * cos;
    let beta = scale * sin;

    let tx = (1.0 - alpha) * center.0 - beta * center.1;
    let ty = beta * center.0 + (1.0 - alpha) * center.1;

    [alpha, beta, tx, -beta, alpha, ty]
}

/// Applies an affine transformation to a point.
fn transform_point(x: f64, y: f64, m: &[f64; 6]) -> (f64, f64) {
    let u = m[0] * x + m[1] * y + m[2];
    let v = m[3] * x + m[4] * y + m[5];
    (u, v)
}

/// A 2D rotation about a center point, scaled about the same point and
/// followed by a translation.
///
/// The transform is an immutable value: the forward matrix and its closed-form
/// inverse are computed once on construction. Positive angles rotate
/// counter-clockwise as seen on screen (y axis pointing down).
///
/// # Example
///
/// ```
/// use flowarp_imgproc::warp::AffineTransform;
///
/// let t = AffineTransform::new((2.0, 2.0), 90.0, 1.0);
/// let (x, y) = t.forward(1.0, 1.0);
/// assert!((x - 1.0).abs() < 1e-9 && (y - 3.0).abs() < 1e-9);
///
/// let (x, y) = t.inverse(x, y);
/// assert!((x - 1.0).abs() < 1e-9 && (y - 1.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffineTransform {
    center: (f64, f64),
    angle: f64,
    scale: f64,
    translation: (f64, f64),
    m: [f64; 6],
    m_inv: [f64; 6],
}

impl AffineTransform {
    /// Create a rotation of `angle` degrees about `center`, scaled by `scale`.
    pub fn new(center: (f64, f64), angle: f64, scale: f64) -> Self {
        Self::with_params(center, angle, scale, (0.0, 0.0))
    }

    /// The transform mapping every point to itself.
    pub fn identity() -> Self {
        Self::new((0.0, 0.0), 0.0, 1.0)
    }

    /// Return a copy of the transform with the given translation applied after
    /// the rotation and scaling.
    pub fn with_translation(self, tx: f64, ty: f64) -> Self {
        Self::with_params(self.center, self.angle, self.scale, (tx, ty))
    }

    fn with_params(center: (f64, f64), angle: f64, scale: f64, translation: (f64, f64)) -> Self {
        let mut m = get_rotation_matrix2d(center, angle, scale);
        m[2] += translation.0;
        m[5] += translation.1;

        Self {
            center,
            angle,
            scale,
            translation,
            m,
            m_inv: invert_affine_transform(&m),
        }
    }

    /// The rotation center.
    pub fn center(&self) -> (f64, f64) {
        self.center
    }

    /// The rotation angle in degrees.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// The isotropic scale factor.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// The translation applied after rotating and scaling.
    pub fn translation(&self) -> (f64, f64) {
        self.translation
    }

    /// The 2x3 forward matrix in row-major order.
    pub fn matrix(&self) -> [f64; 6] {
        self.m
    }

    /// The 2x3 inverse matrix in row-major order.
    pub fn inverse_matrix(&self) -> [f64; 6] {
        self.m_inv
    }

    /// True when the linear part is singular (e.g. a zero scale) and the
    /// inverse mapping does not exist.
    pub fn is_degenerate(&self) -> bool {
        let det = self.m[0] * self.m[4] - self.m[1] * self.m[3];
        det == 0.0 || !det.is_finite()
    }

    /// Map a source coordinate to its destination coordinate.
    pub fn forward(&self, x: f64, y: f64) -> (f64, f64) {
        transform_point(x, y, &self.m)
    }

    /// Map a destination coordinate back to its source coordinate.
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        transform_point(x, y, &self.m_inv)
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn rotation_matrix_quarter_turn() {
        let m = get_rotation_matrix2d((0.5, 0.5), 90.0, 1.0);
        let expected = [0.0, 1.0, 0.0, -1.0, 0.0, 1.0];
        for (a, b) in m.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn invert_known_matrix() {
        let m = [2.0, 0.0, 4.0, 0.0, 4.0, -8.0];
        assert_eq!(
            invert_affine_transform(&m),
            [0.5, 0.0, -2.0, 0.0, 0.25, 2.0]
        );
    }

    #[test]
    fn inverse_law_holds() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let center = (rng.random_range(-500.0..500.0), rng.random_range(-500.0..500.0));
            let angle = rng.random_range(-720.0..720.0);
            let t = AffineTransform::new(center, angle, 1.0);

            for _ in 0..20 {
                let (x, y) = (rng.random_range(-2000.0..2000.0), rng.random_range(-2000.0..2000.0));
                let (u, v) = t.forward(x, y);
                let (xr, yr) = t.inverse(u, v);
                assert_abs_diff_eq!(xr, x, epsilon = 1e-6);
                assert_abs_diff_eq!(yr, y, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn inverse_law_with_scale_and_translation() {
        let t = AffineTransform::new((10.0, 20.0), 33.0, 0.75).with_translation(-4.0, 9.5);
        assert_eq!(t.translation(), (-4.0, 9.5));
        let (u, v) = t.forward(3.0, -7.0);
        let (x, y) = t.inverse(u, v);
        assert_abs_diff_eq!(x, 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, -7.0, epsilon = 1e-9);
    }

    #[test]
    fn center_is_a_fixed_point() {
        let t = AffineTransform::new((12.0, 7.0), 123.0, 1.7);
        let (x, y) = t.forward(12.0, 7.0);
        assert_abs_diff_eq!(x, 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 7.0, epsilon = 1e-9);
    }

    #[test]
    fn identity_maps_exactly() {
        let t = AffineTransform::identity();
        assert_eq!(t.forward(3.0, 4.0), (3.0, 4.0));
        assert_eq!(t.inverse(3.0, 4.0), (3.0, 4.0));
        assert!(!t.is_degenerate());
    }

    #[test]
    fn zero_scale_is_degenerate() {
        let t = AffineTransform::new((5.0, 5.0), 30.0, 0.0);
        assert!(t.is_degenerate());
        assert_eq!(t.forward(0.0, 0.0), (5.0, 5.0));
        assert_eq!(t.forward(9.0, 2.0), (5.0, 5.0));
    }
}
