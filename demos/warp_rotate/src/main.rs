use argh::FromArgs;

use flowarp::{
    image::{ops, Image, ImageSize},
    imgproc::{
        interpolation::InterpolationMode,
        warp::{self, AffineTransform, WarpMode},
    },
};

#[derive(FromArgs)]
/// Rotate a synthetic frame with forward and backward warping and compare them
struct Args {
    /// the largest rotation angle in degrees (default: 45)
    #[argh(option, short = 'a', default = "45.0")]
    angle: f64,

    /// the isotropic scale (default: 1)
    #[argh(option, short = 's', default = "1.0")]
    scale: f64,

    /// the number of angles swept between 0 and the largest one (default: 8)
    #[argh(option, short = 'n', default = "8")]
    steps: usize,

    /// the side of the square frame in pixels (default: 128)
    #[argh(option, default = "128")]
    size: usize,

    /// interpolation of the backward warp: bilinear, nearest (default: bilinear)
    #[argh(option, short = 'i', default = "String::from(\"bilinear\")")]
    interpolation: String,
}

/// A checkerboard over a diagonal ramp, never zero so that holes stand out.
fn synthetic_frame(size: ImageSize) -> Result<Image<u8, 3>, Box<dyn std::error::Error>> {
    let mut data = Vec::with_capacity(size.width * size.height * 3);
    for y in 0..size.height {
        for x in 0..size.width {
            let cell = if (x / 16 + y / 16) % 2 == 0 { 200u8 } else { 60 };
            let ramp = (1 + 254 * (x + y) / (size.width + size.height)) as u8;
            data.extend_from_slice(&[cell, ramp, 255 - cell]);
        }
    }
    Ok(Image::new(size, data)?)
}

fn count_background(image: &Image<u8, 3>) -> usize {
    image
        .as_slice()
        .chunks_exact(3)
        .filter(|px| px.iter().all(|&v| v == 0))
        .count()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let interpolation = match args.interpolation.as_str() {
        "nearest" => InterpolationMode::Nearest,
        "bilinear" => InterpolationMode::Bilinear,
        other => return Err(format!("unknown interpolation: {other}").into()),
    };

    let size = ImageSize {
        width: args.size,
        height: args.size,
    };
    let frame = synthetic_frame(size)?;
    let center = (size.width as f64 / 2.0, size.height as f64 / 2.0);

    for step in 0..=args.steps {
        let angle = args.angle * step as f64 / args.steps.max(1) as f64;
        let transform = AffineTransform::new(center, angle, args.scale);

        let forward = warp::warp(&frame, &transform, WarpMode::Forward)?;
        let backward = warp::warp(&frame, &transform, WarpMode::Backward(interpolation))?;

        // what the display sink would show
        let pair = ops::hconcat(&forward, &backward)?;

        log::info!(
            "angle {angle:6.2}: forward leaves {} background pixels, backward {} ({} pair)",
            count_background(&forward),
            count_background(&backward),
            pair.size()
        );
    }

    Ok(())
}
