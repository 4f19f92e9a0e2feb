use flowarp_image::{Image, ImageError};
use flowarp_imgproc::{
    core::add_saturating,
    draw::{draw_filled_circle, draw_line},
};

/// How the motion trails and the current positions are drawn.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrailStyle {
    /// RGB color of the trail segments.
    pub line_color: [u8; 3],
    /// Thickness of the trail segments in pixels.
    pub line_thickness: usize,
    /// RGB color of the dots at the current positions.
    pub dot_color: [u8; 3],
    /// Radius of the dots in pixels.
    pub dot_radius: usize,
}

impl Default for TrailStyle {
    fn default() -> Self {
        Self {
            line_color: [0, 255, 0],
            line_thickness: 2,
            dot_color: [255, 0, 0],
            dot_radius: 5,
        }
    }
}

// positions are truncated to the pixel grid
fn to_pixel(p: [f32; 2]) -> (i64, i64) {
    (p[0] as i64, p[1] as i64)
}

/// Append the segment `from -> to` to the trail canvas.
pub fn draw_segment(trail: &mut Image<u8, 3>, from: [f32; 2], to: [f32; 2], style: &TrailStyle) {
    draw_line(
        trail,
        to_pixel(from),
        to_pixel(to),
        style.line_color,
        style.line_thickness,
    );
}

/// Render `frame` with the trail canvas on top and a dot at every position.
///
/// The dots are drawn on a copy of the frame which is then added to the
/// trail with saturation, so a trail never hides a dot and vice versa.
///
/// # Errors
///
/// Returns an error when the frame and the trail differ in size.
pub fn render_overlay(
    frame: &Image<u8, 3>,
    trail: &Image<u8, 3>,
    positions: impl IntoIterator<Item = [f32; 2]>,
    style: &TrailStyle,
) -> Result<Image<u8, 3>, ImageError> {
    let mut marked = frame.clone();
    for p in positions {
        draw_filled_circle(&mut marked, to_pixel(p), style.dot_radius, style.dot_color);
    }

    let mut out = Image::<u8, 3>::from_size_val(frame.size(), 0)?;
    add_saturating(&marked, trail, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_accumulate_on_the_canvas() -> Result<(), ImageError> {
        let style = TrailStyle {
            line_thickness: 1,
            ..Default::default()
        };
        let mut trail = Image::<u8, 3>::from_size_val([10, 10].into(), 0)?;
        draw_segment(&mut trail, [1.0, 1.0], [4.0, 1.0], &style);
        draw_segment(&mut trail, [4.0, 1.0], [4.9, 5.7], &style);

        for x in 1..=4 {
            assert_eq!(trail.pixel(x, 1)?, &[0, 255, 0]);
        }
        for y in 1..=5 {
            assert_eq!(trail.pixel(4, y)?, &[0, 255, 0]);
        }
        assert_eq!(trail.pixel(8, 8)?, &[0, 0, 0]);
        Ok(())
    }

    #[test]
    fn overlay_adds_trail_and_dots() -> Result<(), ImageError> {
        let style = TrailStyle {
            dot_radius: 1,
            ..Default::default()
        };
        let frame = Image::<u8, 3>::from_size_val([8, 8].into(), 10)?;
        let mut trail = Image::<u8, 3>::from_size_val(frame.size(), 0)?;
        trail.set_pixel(0, 0, 1, 250)?;

        let out = render_overlay(&frame, &trail, [[5.6, 5.2]], &style)?;

        // saturating add of frame and trail
        assert_eq!(out.pixel(0, 0)?, &[10, 255, 10]);
        // dot centered on the truncated position
        assert_eq!(out.pixel(5, 5)?, &[255, 0, 0]);
        assert_eq!(out.pixel(4, 5)?, &[255, 0, 0]);
        assert_eq!(out.pixel(7, 7)?, &[10, 10, 10]);
        // the frame itself is untouched
        assert_eq!(frame.pixel(5, 5)?, &[10, 10, 10]);
        Ok(())
    }

    #[test]
    fn overlay_rejects_mismatched_trail() -> Result<(), ImageError> {
        let frame = Image::<u8, 3>::from_size_val([8, 8].into(), 0)?;
        let trail = Image::<u8, 3>::from_size_val([8, 4].into(), 0)?;
        assert!(render_overlay(&frame, &trail, [], &TrailStyle::default()).is_err());
        Ok(())
    }
}
