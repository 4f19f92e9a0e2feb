/// An error type for the image and image processing crates.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the data length does not match the image size.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images that must agree in size do not.
    #[error("Image size mismatch: expected ({0}x{1}), got ({2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when a pixel coordinate falls outside of the image.
    #[error("Pixel index ({0}, {1}) is out of bounds for an image of size ({2}x{3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index {0} is out of bounds, the image has {1} channels")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when a filter kernel is empty.
    #[error("Invalid kernel length: kernel_x ({0}), kernel_y ({1})")]
    InvalidKernelLength(usize, usize),

    /// Error when an operation receives an unusable parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
