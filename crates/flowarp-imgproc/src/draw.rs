use flowarp_image::Image;

/// Write `color` at `(x, y)`, ignoring positions outside of the image.
fn set_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x < 0 || y < 0 || x >= img.cols() as i64 || y >= img.rows() as i64 {
        return;
    }
    let idx = (y as usize * img.cols() + x as usize) * C;
    img.as_slice_mut()[idx..idx + C].copy_from_slice(&color);
}

/// Draws a line on an image inplace.
///
/// The line is rasterized with Bresenham's algorithm; a thickness above one
/// stamps a square of that side at every step. Pixels falling outside of the
/// image are clipped.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The start point of the line as a tuple of (x, y).
/// * `p1` - The end point of the line as a tuple of (x, y).
/// * `color` - The color of the line as an array of `C` values.
/// * `thickness` - The thickness of the line.
pub fn draw_line<const C: usize>(
    img: &mut Image<u8, C>,
    p0: (i64, i64),
    p1: (i64, i64),
    color: [u8; C],
    thickness: usize,
) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;

    // the stamp covers [-lo, hi] so that even thicknesses keep their width
    let hi = thickness.saturating_sub(1) as i64 / 2;
    let lo = thickness.saturating_sub(1) as i64 - hi;

    loop {
        for j in -lo..=hi {
            for i in -lo..=hi {
                set_pixel(img, x0 + i, y0 + j, color);
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Draws a filled circle on an image inplace.
///
/// Every pixel whose distance to `center` is at most `radius` is set.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `center` - The center of the circle as a tuple of (x, y).
/// * `radius` - The radius of the circle in pixels.
/// * `color` - The color of the circle as an array of `C` values.
pub fn draw_filled_circle<const C: usize>(
    img: &mut Image<u8, C>,
    center: (i64, i64),
    radius: usize,
    color: [u8; C],
) {
    let (cx, cy) = center;
    let r = radius as i64;
    for y in cy - r..=cy + r {
        for x in cx - r..=cx + r {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= r * r {
                set_pixel(img, x, y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowarp_image::{ImageError, ImageSize};

    #[test]
    fn test_draw_line() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::new(
            ImageSize {
                width: 5,
                height: 5,
            },
            vec![0; 25],
        )?;
        draw_line(&mut img, (0, 0), (4, 4), [255], 1);

        #[rustfmt::skip]
        assert_eq!(
            img.as_slice(),
            vec![
                255, 0, 0, 0, 0,
                0, 255, 0, 0, 0,
                0, 0, 255, 0, 0,
                0, 0, 0, 255, 0,
                0, 0, 0, 0, 255,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_draw_thick_line_is_clipped() -> Result<(), ImageError> {
        let mut img = Image::<u8, 3>::from_size_val([4, 3].into(), 0)?;
        draw_line(&mut img, (-2, 1), (5, 1), [0, 255, 0], 2);

        for y in 0..3 {
            for x in 0..4 {
                let expected = if y <= 1 { [0, 255, 0] } else { [0, 0, 0] };
                assert_eq!(img.pixel(x, y)?, &expected);
            }
        }
        Ok(())
    }

    #[test]
    fn test_draw_filled_circle() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val([5, 5].into(), 0)?;
        draw_filled_circle(&mut img, (2, 2), 1, [9]);

        #[rustfmt::skip]
        assert_eq!(
            img.as_slice(),
            &[
                0, 0, 0, 0, 0,
                0, 0, 9, 0, 0,
                0, 9, 9, 9, 0,
                0, 0, 9, 0, 0,
                0, 0, 0, 0, 0,
            ]
        );

        // a circle partly outside of the image is clipped
        draw_filled_circle(&mut img, (0, 0), 5, [1]);
        assert_eq!(*img.get_pixel(0, 0, 0)?, 1);
        assert_eq!(*img.get_pixel(4, 4, 0)?, 0);
        Ok(())
    }
}
