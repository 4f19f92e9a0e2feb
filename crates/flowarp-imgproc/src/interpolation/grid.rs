use flowarp_image::{Image, ImageError, ImageSize};

/// Create a meshgrid of x and y coordinates from a function of the pixel position.
///
/// # Arguments
///
/// * `cols` - The number of columns indicating the width of the grid
/// * `rows` - The number of rows indicating the height of the grid
/// * `f` - Maps a destination pixel `(x, y)` to the coordinate to store.
///
/// # Returns
///
/// A tuple of single channel images of shape (rows, cols) containing the x and y coordinates
pub fn meshgrid_from_fn(
    cols: usize,
    rows: usize,
    f: impl Fn(usize, usize) -> (f32, f32),
) -> Result<(Image<f32, 1>, Image<f32, 1>), ImageError> {
    let mut map_x = Vec::with_capacity(rows * cols);
    let mut map_y = Vec::with_capacity(rows * cols);

    for r in 0..rows {
        for c in 0..cols {
            let (x, y) = f(c, r);
            map_x.push(x);
            map_y.push(y);
        }
    }

    let size = ImageSize {
        width: cols,
        height: rows,
    };

    Ok((Image::new(size, map_x)?, Image::new(size, map_y)?))
}
