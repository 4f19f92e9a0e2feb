#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use flowarp_image as image;

#[doc(inline)]
pub use flowarp_imgproc as imgproc;

#[doc(inline)]
pub use flowarp_tracking as tracking;
